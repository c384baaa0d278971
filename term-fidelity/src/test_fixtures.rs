//! Common test fixtures for fidelity scenarios.
//!
//! These build small, seeded Arrow batches that reproduce the situations the
//! library has to handle: datasets sharing a block of identical rows, and
//! numeric data whose heavy tail makes the Freedman–Diaconis rule explode.

use crate::error::Result;
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Random lowercase string of `len` letters.
pub fn lexify(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'a' + rng.random_range(0..26u8)))
        .collect()
}

/// `rows` records of two random 8-letter fields.
pub fn record_block(rng: &mut impl Rng, rows: usize) -> Vec<(String, String)> {
    (0..rows)
        .map(|_| (lexify(rng, 8), lexify(rng, 8)))
        .collect()
}

/// Builds a batch with string columns `foo` and `bar` from records.
pub fn records_batch(records: &[(String, String)]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("foo", DataType::Utf8, false),
        Field::new("bar", DataType::Utf8, false),
    ]));
    let foo: Vec<&str> = records.iter().map(|(f, _)| f.as_str()).collect();
    let bar: Vec<&str> = records.iter().map(|(_, b)| b.as_str()).collect();
    Ok(RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(foo)) as ArrayRef,
            Arc::new(StringArray::from(bar)) as ArrayRef,
        ],
    )?)
}

/// Two datasets `A = X ∪ Y` and `B = Y ∪ Z` built from three disjoint blocks of
/// `block_rows` random records each. Returns `(A, B)`; they share exactly
/// `block_rows` distinct rows.
pub fn overlapping_record_sets(block_rows: usize, seed: u64) -> Result<(RecordBatch, RecordBatch)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = record_block(&mut rng, block_rows);
    let y = record_block(&mut rng, block_rows);
    let z = record_block(&mut rng, block_rows);

    let a: Vec<_> = x.into_iter().chain(y.iter().cloned()).collect();
    let b: Vec<_> = y.into_iter().chain(z).collect();
    Ok((records_batch(&a)?, records_batch(&b)?))
}

/// Numeric batch with a heavy-tailed spending pair and an independent age.
///
/// `spend` sits in `[0, 1)` except one row in a thousand, which lands in
/// `[1e5, 1e6)`; `spend_with_tax` tracks it closely. The first principal
/// component of this data is a tight cluster plus a few far outliers, the
/// shape on which Freedman–Diaconis asks for thousands of bins.
pub fn skewed_spend_batch(rows: usize, seed: u64) -> Result<RecordBatch> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut spend = Vec::with_capacity(rows);
    let mut spend_with_tax = Vec::with_capacity(rows);
    let mut age = Vec::with_capacity(rows);

    for i in 0..rows {
        let base: f64 = if i % 1000 == 999 {
            1.0e5 + rng.random::<f64>() * 9.0e5
        } else {
            rng.random::<f64>()
        };
        spend.push(base);
        spend_with_tax.push(base * 1.08 + rng.random::<f64>() * 0.001);
        age.push(18.0 + rng.random::<f64>() * 72.0);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("spend", DataType::Float64, false),
        Field::new("spend_with_tax", DataType::Float64, false),
        Field::new("age", DataType::Float64, false),
    ]));
    Ok(RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(spend)) as ArrayRef,
            Arc::new(Float64Array::from(spend_with_tax)) as ArrayRef,
            Arc::new(Float64Array::from(age)) as ArrayRef,
        ],
    )?)
}
