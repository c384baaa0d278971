//! Shared bin-edge selection for a train/synthetic numeric column pair.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::estimators::BinEstimator;
use crate::error::{FidelityError, Result};

/// Default ceiling on the number of bin edges.
pub const DEFAULT_MAX_BINS: usize = 500;

/// Configuration for [`AdaptiveBinner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningConfig {
    /// A candidate edge sequence is accepted only when it has fewer edges than this.
    pub max_bins: usize,
    /// Estimators tried in order; the first one under the ceiling wins.
    pub estimators: Vec<BinEstimator>,
    /// Half-width of the interval used when every value is identical.
    pub degenerate_half_width: f64,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            max_bins: DEFAULT_MAX_BINS,
            estimators: vec![BinEstimator::FreedmanDiaconis, BinEstimator::Doane],
            degenerate_half_width: 0.5,
        }
    }
}

impl BinningConfig {
    /// Sets the edge-count ceiling.
    pub fn with_max_bins(mut self, max_bins: usize) -> Self {
        self.max_bins = max_bins;
        self
    }

    /// Replaces the estimator chain.
    pub fn with_estimators(mut self, estimators: Vec<BinEstimator>) -> Self {
        self.estimators = estimators;
        self
    }

    /// Appends an estimator to the end of the chain.
    pub fn then(mut self, estimator: BinEstimator) -> Self {
        self.estimators.push(estimator);
        self
    }

    /// Checks that the configuration can produce a valid edge sequence.
    pub fn validate(&self) -> Result<()> {
        if self.max_bins < 3 {
            return Err(FidelityError::configuration(format!(
                "max_bins must be at least 3, got {}",
                self.max_bins
            )));
        }
        if self.estimators.is_empty() {
            return Err(FidelityError::configuration(
                "at least one bin estimator is required",
            ));
        }
        if !(self.degenerate_half_width > 0.0 && self.degenerate_half_width.is_finite()) {
            return Err(FidelityError::configuration(format!(
                "degenerate_half_width must be positive and finite, got {}",
                self.degenerate_half_width
            )));
        }
        Ok(())
    }
}

/// Which rule produced a [`BinEdges`] sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinSelection {
    /// An estimator from the configured chain stayed under the ceiling.
    Estimator(BinEstimator),
    /// Every estimator was rejected; equal-width edges at the ceiling were used.
    Capped,
}

/// A strictly increasing edge sequence shared by the train and synthetic histograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinEdges {
    /// Edge values; bin `i` is `[edges[i], edges[i + 1])`, the last bin closed.
    pub edges: Vec<f64>,
    /// The rule that produced the edges.
    pub selection: BinSelection,
}

impl BinEdges {
    /// Number of bins (one less than the number of edges).
    pub fn num_bins(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    /// Returns the edges as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.edges
    }

    /// Consumes the value, returning the edges.
    pub fn into_edges(self) -> Vec<f64> {
        self.edges
    }
}

/// Chooses histogram bin edges for a numeric field, bounding the bin count.
///
/// The edges cover the union range of both columns so the two histograms are
/// comparable, while the bin width is estimated from the training column only.
/// The configured estimators are evaluated in order; a candidate whose edge
/// count reaches `max_bins` is rejected before any edges are materialized, and
/// the next estimator is tried. With the default `[FreedmanDiaconis, Doane]`
/// chain this keeps outlier-heavy or skewed columns, where a tiny IQR meets a
/// huge range, from producing hundreds of thousands of bins.
///
/// # Example
///
/// ```rust
/// use term_fidelity::binning::{AdaptiveBinner, BinEstimator, BinSelection, BinningConfig};
///
/// // A tight cluster plus one extreme outlier.
/// let mut train: Vec<f64> = (0..1000).map(|i| (i % 10) as f64 * 0.001).collect();
/// train.push(1.0e6);
/// let synth = vec![0.0, 0.005, 0.009];
///
/// let edges = AdaptiveBinner::new(BinningConfig::default())
///     .bin_edges(&train, &synth)
///     .unwrap();
/// assert!(edges.edges.len() < 500);
/// assert_eq!(edges.selection, BinSelection::Estimator(BinEstimator::Doane));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AdaptiveBinner {
    config: BinningConfig,
}

impl AdaptiveBinner {
    /// Creates a binner with the given configuration.
    pub fn new(config: BinningConfig) -> Self {
        Self { config }
    }

    /// Returns the binner configuration.
    pub fn config(&self) -> &BinningConfig {
        &self.config
    }

    /// Computes shared bin edges for a train/synthetic column pair.
    ///
    /// # Errors
    ///
    /// - [`FidelityError::EmptyInput`] if either column is empty
    /// - [`FidelityError::InvalidData`] if any value is NaN or infinite
    /// - [`FidelityError::Configuration`] if the configuration is invalid
    #[instrument(skip_all, fields(train = train.len(), synth = synth.len(), max_bins = self.config.max_bins))]
    pub fn bin_edges(&self, train: &[f64], synth: &[f64]) -> Result<BinEdges> {
        self.config.validate()?;
        check_column("train", train)?;
        check_column("synthetic", synth)?;

        let (first, last) = self.shared_range(train, synth)?;

        for &estimator in &self.config.estimators {
            let width = estimator.bin_width(train);
            let num_bins = if width > 0.0 {
                ((last - first) / width).ceil()
            } else {
                1.0
            };
            let num_edges = num_bins + 1.0;

            if num_edges < self.config.max_bins as f64 {
                debug!(estimator = %estimator, num_edges, "accepted bin estimator");
                return Ok(BinEdges {
                    edges: linspace(first, last, num_bins as usize),
                    selection: BinSelection::Estimator(estimator),
                });
            }

            debug!(
                estimator = %estimator,
                num_edges,
                max_bins = self.config.max_bins,
                "rejected bin estimator, edge count over ceiling"
            );
        }

        warn!(
            max_bins = self.config.max_bins,
            "every bin estimator exceeded the ceiling, using equal-width edges"
        );
        Ok(BinEdges {
            edges: linspace(first, last, self.config.max_bins - 2),
            selection: BinSelection::Capped,
        })
    }

    /// Union range of both columns, widened when all values are identical.
    fn shared_range(&self, train: &[f64], synth: &[f64]) -> Result<(f64, f64)> {
        let (first, last) = train
            .iter()
            .chain(synth)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        if first < last {
            if !(last - first).is_finite() {
                return Err(FidelityError::invalid_data(format!(
                    "range [{first}, {last}] is too wide to bin"
                )));
            }
            return Ok((first, last));
        }

        let pad = self
            .config
            .degenerate_half_width
            .max(first.abs() * 2.0 * f64::EPSILON);
        debug!(value = first, pad, "constant column, widening range");
        Ok((first - pad, last + pad))
    }
}

/// Computes shared bin edges with the default estimator chain and the given ceiling.
pub fn numeric_bin_edges(train: &[f64], synth: &[f64], max_bins: usize) -> Result<Vec<f64>> {
    AdaptiveBinner::new(BinningConfig::default().with_max_bins(max_bins))
        .bin_edges(train, synth)
        .map(BinEdges::into_edges)
}

fn check_column(side: &str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(FidelityError::empty_input(format!("{side} column has no values")));
    }
    if let Some((row, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(FidelityError::invalid_data(format!(
            "{side} column has non-finite value {v} at row {row}"
        )));
    }
    Ok(())
}

/// `num_bins + 1` evenly spaced edges from `first` to `last` inclusive.
///
/// Edges that collapse onto their neighbour through rounding are dropped so the
/// result stays strictly increasing.
fn linspace(first: f64, last: f64, num_bins: usize) -> Vec<f64> {
    let num_bins = num_bins.max(1);
    let step = (last - first) / num_bins as f64;
    let mut edges: Vec<f64> = (0..num_bins).map(|i| first + step * i as f64).collect();
    edges.push(last);
    edges.dedup();
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strictly_increasing(edges: &[f64]) -> bool {
        edges.windows(2).all(|w| w[0] < w[1])
    }

    /// Tight cluster with a far outlier: FD wants ~10^7 bins.
    fn outlier_heavy() -> Vec<f64> {
        let mut values: Vec<f64> = (0..2000).map(|i| (i % 100) as f64 * 0.01).collect();
        values.push(100_000.0);
        values
    }

    #[test]
    fn test_default_config() {
        let config = BinningConfig::default();
        assert_eq!(config.max_bins, 500);
        assert_eq!(
            config.estimators,
            vec![BinEstimator::FreedmanDiaconis, BinEstimator::Doane]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fd_used_for_well_behaved_data() {
        let train: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let synth: Vec<f64> = (0..100).map(|i| i as f64 + 0.5).collect();
        let edges = AdaptiveBinner::default().bin_edges(&train, &synth).unwrap();

        assert_eq!(
            edges.selection,
            BinSelection::Estimator(BinEstimator::FreedmanDiaconis)
        );
        assert_eq!(edges.edges[0], 0.0);
        assert_eq!(*edges.edges.last().unwrap(), 99.5);
        assert!(strictly_increasing(&edges.edges));
    }

    #[test]
    fn test_outliers_fall_back_to_doane() {
        let train = outlier_heavy();
        let edges = AdaptiveBinner::default().bin_edges(&train, &[0.5]).unwrap();

        assert_eq!(edges.selection, BinSelection::Estimator(BinEstimator::Doane));
        assert!(edges.edges.len() < 500);
        assert!(strictly_increasing(&edges.edges));
    }

    #[test]
    fn test_exhausted_chain_is_capped() {
        let binner = AdaptiveBinner::new(
            BinningConfig::default().with_estimators(vec![BinEstimator::FreedmanDiaconis]),
        );
        let edges = binner.bin_edges(&outlier_heavy(), &[0.5]).unwrap();

        assert_eq!(edges.selection, BinSelection::Capped);
        assert_eq!(edges.edges.len(), 499);
        assert!(strictly_increasing(&edges.edges));
    }

    #[test]
    fn test_appended_estimator_is_reached() {
        let binner = AdaptiveBinner::new(
            BinningConfig::default()
                .with_max_bins(5)
                .with_estimators(vec![BinEstimator::FreedmanDiaconis])
                .then(BinEstimator::Sturges),
        );
        // FD wants 24 bins because of the outlier; Sturges wants 5 bins (6 edges),
        // which is still over a ceiling of 5, so the chain ends in the cap.
        let train = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 90.0];
        let edges = binner.bin_edges(&train, &train).unwrap();
        assert_eq!(edges.selection, BinSelection::Capped);
        assert_eq!(edges.edges.len(), 4);

        let binner = AdaptiveBinner::new(
            BinningConfig::default()
                .with_max_bins(7)
                .with_estimators(vec![BinEstimator::FreedmanDiaconis])
                .then(BinEstimator::Sturges),
        );
        let edges = binner.bin_edges(&train, &train).unwrap();
        assert_eq!(edges.selection, BinSelection::Estimator(BinEstimator::Sturges));
        assert_eq!(edges.num_bins(), 5);
    }

    #[test]
    fn test_synthetic_range_extends_edges() {
        let train = [1.0, 2.0, 3.0, 4.0];
        let synth = [-10.0, 20.0];
        let edges = AdaptiveBinner::default().bin_edges(&train, &synth).unwrap();
        assert_eq!(edges.edges[0], -10.0);
        assert_eq!(*edges.edges.last().unwrap(), 20.0);
    }

    #[test]
    fn test_constant_column_is_widened() {
        let edges = AdaptiveBinner::default()
            .bin_edges(&[3.0, 3.0, 3.0], &[3.0])
            .unwrap();
        assert_eq!(edges.edges, vec![2.5, 3.5]);
    }

    #[test]
    fn test_constant_column_with_large_magnitude() {
        let edges = AdaptiveBinner::default()
            .bin_edges(&[1.0e17, 1.0e17], &[1.0e17])
            .unwrap();
        assert!(edges.edges.len() >= 2);
        assert!(strictly_increasing(&edges.edges));
    }

    #[test]
    fn test_empty_columns_are_errors() {
        let binner = AdaptiveBinner::default();
        assert!(matches!(
            binner.bin_edges(&[], &[1.0]),
            Err(FidelityError::EmptyInput(_))
        ));
        assert!(matches!(
            binner.bin_edges(&[1.0], &[]),
            Err(FidelityError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_non_finite_values_are_errors() {
        let binner = AdaptiveBinner::default();
        assert!(matches!(
            binner.bin_edges(&[1.0, f64::NAN], &[1.0]),
            Err(FidelityError::InvalidData(_))
        ));
        assert!(matches!(
            binner.bin_edges(&[1.0], &[f64::INFINITY]),
            Err(FidelityError::InvalidData(_))
        ));
    }

    #[test]
    fn test_invalid_config() {
        let binner = AdaptiveBinner::new(BinningConfig::default().with_max_bins(2));
        assert!(matches!(
            binner.bin_edges(&[1.0], &[2.0]),
            Err(FidelityError::Configuration(_))
        ));

        let binner = AdaptiveBinner::new(BinningConfig::default().with_estimators(vec![]));
        assert!(matches!(
            binner.bin_edges(&[1.0], &[2.0]),
            Err(FidelityError::Configuration(_))
        ));
    }

    #[test]
    fn test_numeric_bin_edges_returns_plain_edges() {
        let train: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let edges = numeric_bin_edges(&train, &train, DEFAULT_MAX_BINS).unwrap();
        assert!(edges.len() >= 2 && edges.len() < DEFAULT_MAX_BINS);
        assert!(strictly_increasing(&edges));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: BinningConfig = serde_json::from_str(r#"{"max_bins": 100}"#).unwrap();
        assert_eq!(config.max_bins, 100);
        assert_eq!(config.estimators.len(), 2);
        assert_eq!(config.degenerate_half_width, 0.5);
    }
}
