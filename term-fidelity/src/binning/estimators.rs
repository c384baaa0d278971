//! Histogram bin-width estimators.
//!
//! Each estimator maps a sample to a bin width using the classical formulas
//! (compatible with numpy's `histogram_bin_edges`). A width of 0 means the
//! estimator has no opinion and the caller should use a single bin.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A rule for choosing histogram bin width from sample statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinEstimator {
    /// `2·IQR·n^(-1/3)`. Robust for typical fields, but a narrow IQR next to
    /// extreme outliers yields an enormous bin count over the full range.
    #[serde(rename = "fd")]
    FreedmanDiaconis,
    /// `ptp / (1 + log2 n + log2(1 + |g1| / σg1))`, Sturges corrected for
    /// sample skewness `g1`. Grows only logarithmically with `n`.
    Doane,
    /// `ptp / (log2 n + 1)`.
    Sturges,
}

impl BinEstimator {
    /// Short identifier used in logs and serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            BinEstimator::FreedmanDiaconis => "fd",
            BinEstimator::Doane => "doane",
            BinEstimator::Sturges => "sturges",
        }
    }

    /// Returns the bin width this estimator picks for `values`.
    ///
    /// `values` should be finite. An empty slice yields 0 (a single bin).
    pub fn bin_width(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            BinEstimator::FreedmanDiaconis => freedman_diaconis_width(values),
            BinEstimator::Doane => doane_width(values),
            BinEstimator::Sturges => sturges_width(values),
        }
    }
}

impl fmt::Display for BinEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn freedman_diaconis_width(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let iqr = percentile(&sorted, 0.75) - percentile(&sorted, 0.25);
    2.0 * iqr * (sorted.len() as f64).powf(-1.0 / 3.0)
}

fn doane_width(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 2 {
        return 0.0;
    }
    let nf = n as f64;
    let sg1 = (6.0 * (nf - 2.0) / ((nf + 1.0) * (nf + 3.0))).sqrt();
    let mean = values.iter().sum::<f64>() / nf;
    let sigma = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / nf).sqrt();
    if sigma <= 0.0 {
        return 0.0;
    }
    let g1 = values
        .iter()
        .map(|v| ((v - mean) / sigma).powi(3))
        .sum::<f64>()
        / nf;
    peak_to_peak(values) / (1.0 + nf.log2() + (1.0 + g1.abs() / sg1).log2())
}

fn sturges_width(values: &[f64]) -> f64 {
    peak_to_peak(values) / ((values.len() as f64).log2() + 1.0)
}

fn peak_to_peak(values: &[f64]) -> f64 {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    max - min
}

/// Linearly interpolated percentile of an ascending slice, `q` in `[0, 1]`.
pub(crate) fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 1.0), 4.0);
        assert!((percentile(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((percentile(&sorted, 0.75) - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_freedman_diaconis_width() {
        // IQR = 1.5, n = 4: 2 * 1.5 * 4^(-1/3)
        let width = BinEstimator::FreedmanDiaconis.bin_width(&[4.0, 1.0, 3.0, 2.0]);
        assert!((width - 3.0 * 4f64.powf(-1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_freedman_diaconis_zero_iqr() {
        let mut values = vec![5.0; 99];
        values.push(1e6);
        assert_eq!(BinEstimator::FreedmanDiaconis.bin_width(&values), 0.0);
    }

    #[test]
    fn test_doane_symmetric_sample() {
        // Zero skew reduces Doane to ptp / (1 + log2 n).
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let width = BinEstimator::Doane.bin_width(&values);
        assert!((width - 7.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_doane_degenerate_inputs() {
        assert_eq!(BinEstimator::Doane.bin_width(&[1.0, 2.0]), 0.0);
        assert_eq!(BinEstimator::Doane.bin_width(&[3.0, 3.0, 3.0]), 0.0);
    }

    #[test]
    fn test_sturges_width() {
        let width = BinEstimator::Sturges.bin_width(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0]);
        assert!((width - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_sample_has_zero_width() {
        for estimator in [
            BinEstimator::FreedmanDiaconis,
            BinEstimator::Doane,
            BinEstimator::Sturges,
        ] {
            assert_eq!(estimator.bin_width(&[]), 0.0, "{estimator}");
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(BinEstimator::FreedmanDiaconis.to_string(), "fd");
        assert_eq!(
            serde_json::to_string(&BinEstimator::Doane).unwrap(),
            "\"doane\""
        );
    }
}
