//! Histograms over shared edges and the numeric fidelity score built on them.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::binner::{AdaptiveBinner, BinEdges, BinningConfig};
use crate::distributions::jensen_shannon_distance;
use crate::error::{FidelityError, Result};

/// Counts `values` into the bins defined by `edges`.
///
/// Bins are half-open `[edges[i], edges[i + 1])` except the last, which also
/// includes its right edge. Values outside `[edges[0], edges[last]]` and
/// non-finite values are not counted.
///
/// # Errors
///
/// Returns [`FidelityError::InvalidData`] when `edges` has fewer than two
/// entries or is not strictly increasing.
pub fn histogram_counts(values: &[f64], edges: &[f64]) -> Result<Vec<u64>> {
    if edges.len() < 2 {
        return Err(FidelityError::invalid_data(format!(
            "need at least 2 bin edges, got {}",
            edges.len()
        )));
    }
    if !edges.windows(2).all(|w| w[0] < w[1]) {
        return Err(FidelityError::invalid_data(
            "bin edges must be strictly increasing",
        ));
    }

    let num_bins = edges.len() - 1;
    let (first, last) = (edges[0], edges[num_bins]);
    let mut counts = vec![0u64; num_bins];

    for &v in values {
        if !(v >= first && v <= last) {
            continue;
        }
        // Number of edges <= v, minus one, is the bin index; v == last lands
        // one past the end and belongs to the closed last bin.
        let bin = (edges.partition_point(|e| *e <= v) - 1).min(num_bins - 1);
        counts[bin] += 1;
    }

    Ok(counts)
}

/// Train and synthetic histograms of one numeric field and their distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramComparison {
    /// Edges shared by both histograms.
    pub edges: BinEdges,
    /// Training counts per bin.
    pub train_counts: Vec<u64>,
    /// Synthetic counts per bin.
    pub synthetic_counts: Vec<u64>,
    /// Jensen–Shannon distance between the two histograms, in `[0, 1]`.
    pub distance: f64,
}

/// Bins both columns on shared adaptive edges and scores the two histograms.
///
/// This is the numeric counterpart of
/// [`crate::distributions::distribution_distance`]; callers comparing principal
/// components run it once per `pcN` column.
#[instrument(skip_all, fields(train = train.len(), synth = synth.len()))]
pub fn numeric_distribution_distance(
    train: &[f64],
    synth: &[f64],
    config: &BinningConfig,
) -> Result<HistogramComparison> {
    let edges = AdaptiveBinner::new(config.clone()).bin_edges(train, synth)?;
    let train_counts = histogram_counts(train, edges.as_slice())?;
    let synthetic_counts = histogram_counts(synth, edges.as_slice())?;

    let p: Vec<f64> = train_counts.iter().map(|&c| c as f64).collect();
    let q: Vec<f64> = synthetic_counts.iter().map(|&c| c as f64).collect();
    let distance = jensen_shannon_distance(&p, &q)?;

    Ok(HistogramComparison {
        edges,
        train_counts,
        synthetic_counts,
        distance,
    })
}
