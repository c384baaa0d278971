//! Categorical field fidelity: distribution extraction and divergence scoring.
//!
//! [`categorical_distribution`] summarizes a column as label → percentage, and
//! [`distribution_distance`] compares two such summaries with the base-2
//! Jensen–Shannon distance. The numeric binner reuses
//! [`jensen_shannon_distance`] to compare histograms built on shared edges.

mod categorical;
mod divergence;

pub use categorical::{categorical_distribution, CategoricalDistribution, CategoryShare};
pub use divergence::{distribution_distance, jensen_shannon_distance, kl_divergence_base2};
