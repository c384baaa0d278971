//! Adaptive histogram binning for numeric fields.
//!
//! [`AdaptiveBinner`] picks one edge sequence per field from the training
//! column, covering the range of both columns, and walks an ordered estimator
//! chain until one stays under the bin ceiling. Both histograms are then built
//! against the same edges with [`histogram_counts`].

mod binner;
mod estimators;
mod histogram;

pub use binner::{
    numeric_bin_edges, AdaptiveBinner, BinEdges, BinSelection, BinningConfig, DEFAULT_MAX_BINS,
};
pub use estimators::BinEstimator;
pub use histogram::{histogram_counts, numeric_distribution_distance, HistogramComparison};
