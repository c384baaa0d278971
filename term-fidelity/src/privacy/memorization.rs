//! Exact-row memorization detection between a training and a synthetic dataset.

use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument};

use super::canonical::RowCanonicalizer;
use crate::error::Result;

/// Counts the distinct rows present in both datasets.
///
/// Rows are compared by full content through [`RowCanonicalizer`], so column
/// order does not matter but the column sets must be equal. A row repeated many
/// times in either dataset counts once. The count is symmetric in its arguments.
///
/// Returns 0 when either dataset has no rows.
///
/// # Errors
///
/// Returns [`crate::error::FidelityError::SchemaMismatch`] when the two datasets
/// do not share the same column set.
#[instrument(skip_all, fields(left_rows = a.num_rows(), right_rows = b.num_rows()))]
pub fn count_memorized_rows(a: &RecordBatch, b: &RecordBatch) -> Result<usize> {
    Ok(memorization_report(a, b)?.memorized_rows)
}

/// Summary of the exact-row overlap between a training and a synthetic dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorizationReport {
    /// Distinct rows in the training dataset.
    pub train_distinct_rows: usize,
    /// Distinct rows in the synthetic dataset.
    pub synthetic_distinct_rows: usize,
    /// Distinct rows found in both datasets.
    pub memorized_rows: usize,
}

impl MemorizationReport {
    /// Share of distinct synthetic rows copied verbatim from training data.
    ///
    /// Zero when the synthetic dataset is empty.
    pub fn memorized_fraction(&self) -> f64 {
        if self.synthetic_distinct_rows == 0 {
            0.0
        } else {
            self.memorized_rows as f64 / self.synthetic_distinct_rows as f64
        }
    }

    /// Returns true when no synthetic row reproduces a training row.
    pub fn is_clean(&self) -> bool {
        self.memorized_rows == 0
    }
}

/// Computes the full memorization report for `train` against `synthetic`.
///
/// See [`count_memorized_rows`] for the comparison rules.
#[instrument(skip_all, fields(train_rows = train.num_rows(), synthetic_rows = synthetic.num_rows()))]
pub fn memorization_report(train: &RecordBatch, synthetic: &RecordBatch) -> Result<MemorizationReport> {
    if train.num_rows() == 0 || synthetic.num_rows() == 0 {
        debug!("empty dataset, nothing to compare");
        return Ok(MemorizationReport {
            train_distinct_rows: distinct_len(train)?,
            synthetic_distinct_rows: distinct_len(synthetic)?,
            memorized_rows: 0,
        });
    }

    let canonicalizer = RowCanonicalizer::new(train.schema().as_ref());
    let train_keys: HashSet<String> = canonicalizer.keys(train)?.into_iter().collect();
    let synthetic_keys: HashSet<String> = canonicalizer.keys(synthetic)?.into_iter().collect();

    let memorized_rows = train_keys.intersection(&synthetic_keys).count();
    debug!(
        train_distinct = train_keys.len(),
        synthetic_distinct = synthetic_keys.len(),
        memorized_rows,
        "computed row overlap"
    );

    Ok(MemorizationReport {
        train_distinct_rows: train_keys.len(),
        synthetic_distinct_rows: synthetic_keys.len(),
        memorized_rows,
    })
}

fn distinct_len(batch: &RecordBatch) -> Result<usize> {
    if batch.num_rows() == 0 {
        return Ok(0);
    }
    let canonicalizer = RowCanonicalizer::new(batch.schema().as_ref());
    Ok(canonicalizer
        .keys(batch)?
        .into_iter()
        .collect::<HashSet<_>>()
        .len())
}
