//! Seeded down-sampling so train and synthetic data enter comparisons at equal size.

use arrow::array::UInt64Array;
use arrow::compute::take_record_batch;
use arrow::record_batch::RecordBatch;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, instrument};

use crate::error::Result;

/// Seed used when the caller does not pick one.
pub const DEFAULT_SAMPLE_SEED: u64 = 333;

/// Down-samples the larger of the two batches to the row count of the smaller.
///
/// Rows are drawn without replacement with a `StdRng` seeded from `seed`, so
/// the same inputs and seed always select the same rows. Kept rows stay in
/// their original order. The smaller batch (or both, when sizes already match)
/// is returned unchanged.
#[instrument(skip_all, fields(train_rows = train.num_rows(), synthetic_rows = synthetic.num_rows(), seed = seed))]
pub fn downsample_to_common_size(
    train: &RecordBatch,
    synthetic: &RecordBatch,
    seed: u64,
) -> Result<(RecordBatch, RecordBatch)> {
    let target = train.num_rows().min(synthetic.num_rows());
    let mut rng = StdRng::seed_from_u64(seed);

    let train = sample_rows(train, target, &mut rng)?;
    let synthetic = sample_rows(synthetic, target, &mut rng)?;
    Ok((train, synthetic))
}

fn sample_rows(batch: &RecordBatch, target: usize, rng: &mut StdRng) -> Result<RecordBatch> {
    if batch.num_rows() <= target {
        return Ok(batch.clone());
    }

    let mut rows = rand::seq::index::sample(rng, batch.num_rows(), target).into_vec();
    rows.sort_unstable();
    debug!(from = batch.num_rows(), to = target, "down-sampled batch");

    let indices = UInt64Array::from_iter_values(rows.into_iter().map(|r| r as u64));
    Ok(take_record_batch(batch, &indices)?)
}
