//! Prelude for commonly used types and functions in term-fidelity.

pub use crate::binning::{
    histogram_counts, numeric_bin_edges, numeric_distribution_distance, AdaptiveBinner,
    BinEdges, BinEstimator, BinSelection, BinningConfig, HistogramComparison, DEFAULT_MAX_BINS,
};
pub use crate::columns::{numeric_columns, numeric_values};
pub use crate::config::FidelityConfig;
pub use crate::distributions::{
    categorical_distribution, distribution_distance, CategoricalDistribution,
};
pub use crate::error::{ErrorContext, FidelityError, Result};
pub use crate::logging::LoggingConfig;
pub use crate::privacy::{count_memorized_rows, memorization_report, MemorizationReport};
pub use crate::reduction::{
    fit_projection, reduce_dimensions, ComponentSelection, DimensionalityReducer, Projection,
    ReducerConfig,
};
pub use crate::sampling::{downsample_to_common_size, DEFAULT_SAMPLE_SEED};
