//! Jensen–Shannon distance between discrete distributions.
//!
//! All logarithms are base 2, so the distance lies in `[0, 1]`: 0 for identical
//! distributions and 1 for distributions with disjoint support.
//!
//! ```text
//! M      = (P + Q) / 2
//! JSD    = ½·KL(P‖M) + ½·KL(Q‖M)
//! result = sqrt(JSD)
//! ```

use std::collections::{BTreeMap, BTreeSet};
use tracing::instrument;

use crate::error::{FidelityError, Result};

/// Computes the Jensen–Shannon distance between two label → weight mappings.
///
/// The mappings may cover different labels; a label missing from one side is
/// treated as weight 0 there. Each side is normalized by its total weight, so
/// percentages (summing to 100) and fractions (summing to 1) are both accepted.
/// A label with zero weight on both sides contributes nothing.
///
/// # Errors
///
/// - [`FidelityError::EmptyInput`] if either side has zero total weight
/// - [`FidelityError::InvalidData`] if any weight is negative or not finite
///
/// # Example
///
/// ```rust
/// use std::collections::BTreeMap;
/// use term_fidelity::distributions::distribution_distance;
///
/// let d1 = BTreeMap::from([("foo".to_string(), 1.0)]);
/// let d2 = BTreeMap::from([("bar".to_string(), 1.0)]);
/// let distance = distribution_distance(&d1, &d2).unwrap();
/// assert!((distance - 1.0).abs() < 1e-9);
/// ```
#[instrument(skip_all, fields(left_labels = d1.len(), right_labels = d2.len()))]
pub fn distribution_distance(d1: &BTreeMap<String, f64>, d2: &BTreeMap<String, f64>) -> Result<f64> {
    let labels: BTreeSet<&str> = d1.keys().chain(d2.keys()).map(String::as_str).collect();

    let p: Vec<f64> = labels
        .iter()
        .map(|label| d1.get(*label).copied().unwrap_or(0.0))
        .collect();
    let q: Vec<f64> = labels
        .iter()
        .map(|label| d2.get(*label).copied().unwrap_or(0.0))
        .collect();

    jensen_shannon_distance(&p, &q)
}

/// Computes the Jensen–Shannon distance between two aligned weight vectors.
///
/// Index `i` of `p` and `q` must refer to the same category (or histogram bin).
/// Both vectors are normalized by their sums before comparison.
pub fn jensen_shannon_distance(p: &[f64], q: &[f64]) -> Result<f64> {
    if p.len() != q.len() {
        return Err(FidelityError::invalid_data(format!(
            "distributions must be aligned, got {} and {} entries",
            p.len(),
            q.len()
        )));
    }

    let p = normalize(p, "first distribution")?;
    let q = normalize(q, "second distribution")?;
    let m: Vec<f64> = p.iter().zip(&q).map(|(a, b)| 0.5 * (a + b)).collect();

    let divergence = 0.5 * kl_divergence_base2(&p, &m) + 0.5 * kl_divergence_base2(&q, &m);

    // Rounding can push the divergence a hair outside [0, 1].
    Ok(divergence.clamp(0.0, 1.0).sqrt())
}

/// Kullback–Leibler divergence `KL(P‖Q)` in bits over probability vectors.
///
/// Terms with `p_i == 0` contribute 0. Returns infinity when some `p_i > 0`
/// meets `q_i == 0`, which cannot happen when `q` is the mixture of `p` with
/// another distribution.
pub fn kl_divergence_base2(p: &[f64], q: &[f64]) -> f64 {
    p.iter()
        .zip(q)
        .map(|(&pi, &qi)| {
            if pi > 0.0 {
                if qi > 0.0 {
                    pi * (pi / qi).log2()
                } else {
                    f64::INFINITY
                }
            } else {
                0.0
            }
        })
        .sum()
}

fn normalize(weights: &[f64], side: &str) -> Result<Vec<f64>> {
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(FidelityError::invalid_data(format!(
            "{side} has invalid weight {bad}; weights must be finite and non-negative"
        )));
    }

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(FidelityError::empty_input(format!("{side} has no mass")));
    }

    Ok(weights.iter().map(|w| w / total).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(label, weight)| (label.to_string(), *weight))
            .collect()
    }

    #[test]
    fn test_disjoint_support_is_one() {
        let d1 = dist(&[("foo", 1.0), ("baz", 0.0)]);
        let d2 = dist(&[("bar", 1.0), ("baz", 0.0)]);
        assert!((distribution_distance(&d1, &d2).unwrap() - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_half_overlap() {
        let d1 = dist(&[("foo", 1.0), ("baz", 0.0)]);
        let d2 = dist(&[("foo", 0.5), ("baz", 0.5)]);
        let distance = distribution_distance(&d1, &d2).unwrap();
        assert!((distance - 0.5579230452841438).abs() < 0.01);
    }

    #[test]
    fn test_zero_labels_do_not_matter() {
        let d1 = dist(&[("foo", 1.0), ("bar", 0.0), ("baz", 0.0)]);
        let d2 = dist(&[("foo", 1.0)]);
        assert!(distribution_distance(&d1, &d2).unwrap().abs() < 0.01);
    }

    #[test]
    fn test_percentages_and_fractions_agree() {
        let percent = dist(&[("a", 25.0), ("b", 75.0)]);
        let fraction = dist(&[("a", 0.25), ("b", 0.75)]);
        let other = dist(&[("a", 0.5), ("b", 0.5)]);
        let d_percent = distribution_distance(&percent, &other).unwrap();
        let d_fraction = distribution_distance(&fraction, &other).unwrap();
        assert!((d_percent - d_fraction).abs() < 1e-12);
    }

    #[test]
    fn test_identical_is_exactly_zero() {
        let d = dist(&[("a", 10.0), ("b", 30.0), ("c", 60.0)]);
        assert_eq!(distribution_distance(&d, &d).unwrap(), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let d1 = dist(&[("a", 10.0), ("b", 90.0)]);
        let d2 = dist(&[("b", 40.0), ("c", 60.0)]);
        assert_eq!(
            distribution_distance(&d1, &d2).unwrap(),
            distribution_distance(&d2, &d1).unwrap()
        );
    }

    #[test]
    fn test_all_zero_distribution_is_empty_input() {
        let d1 = dist(&[("a", 0.0)]);
        let d2 = dist(&[("a", 1.0)]);
        assert!(matches!(
            distribution_distance(&d1, &d2),
            Err(FidelityError::EmptyInput(_))
        ));
        assert!(matches!(
            distribution_distance(&BTreeMap::new(), &BTreeMap::new()),
            Err(FidelityError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_negative_weight_is_invalid() {
        let d1 = dist(&[("a", -1.0), ("b", 2.0)]);
        let d2 = dist(&[("a", 1.0)]);
        assert!(matches!(
            distribution_distance(&d1, &d2),
            Err(FidelityError::InvalidData(_))
        ));
    }

    #[test]
    fn test_misaligned_vectors() {
        assert!(matches!(
            jensen_shannon_distance(&[1.0, 0.0], &[1.0]),
            Err(FidelityError::InvalidData(_))
        ));
    }

    #[test]
    fn test_kl_zero_terms() {
        assert_eq!(kl_divergence_base2(&[0.0, 1.0], &[0.5, 0.5]), 1.0);
        assert!(kl_divergence_base2(&[1.0, 0.0], &[0.0, 1.0]).is_infinite());
    }
}
