//! Dimensionality reduction for multivariate comparison.
//!
//! Fitting and applying are separate steps. A [`Projection`] fitted once is
//! applied to both the training and the synthetic data, and the resulting
//! `pc1..pcK` columns are typically handed to
//! [`crate::binning::AdaptiveBinner`] one component at a time.

mod projection;

pub use projection::{
    fit_projection, reduce_dimensions, ComponentSelection, DimensionalityReducer, Projection,
    ReducerConfig,
};
