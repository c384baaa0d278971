//! End-to-end fidelity audit of a synthetic dataset.
//!
//! This example shows how to:
//! - Load audit settings from JSON
//! - Down-sample the larger dataset to a common size
//! - Compare a categorical field with the Jensen–Shannon distance
//! - Fit one PCA projection and compare each component on adaptive bins
//!
//! Run with:
//! ```bash
//! RUST_LOG=term_fidelity=debug cargo run --example fidelity_audit
//! ```

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use term_fidelity::logging::{init_logging, LoggingConfig};
use term_fidelity::prelude::*;

/// Customer-like data. Every 500th row is a big spender far outside the norm.
fn customers(rows: usize, seed: u64, plan_bias: f64) -> Result<RecordBatch> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut plan = Vec::with_capacity(rows);
    let mut age = Vec::with_capacity(rows);
    let mut spend = Vec::with_capacity(rows);
    let mut visits = Vec::with_capacity(rows);

    for i in 0..rows {
        let draw: f64 = rng.random();
        plan.push(if draw < plan_bias {
            "basic"
        } else if draw < 0.9 {
            "plus"
        } else {
            "pro"
        });
        let a = 18.0 + rng.random::<f64>() * 60.0;
        age.push(a);
        let s = if i % 500 == 499 {
            50_000.0 + rng.random::<f64>() * 500_000.0
        } else {
            rng.random::<f64>() * 20.0
        };
        spend.push(s);
        visits.push(s * 0.1 + rng.random::<f64>());
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("plan", DataType::Utf8, false),
        Field::new("age", DataType::Float64, false),
        Field::new("spend", DataType::Float64, false),
        Field::new("visits", DataType::Float64, false),
    ]));
    Ok(RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(plan)) as ArrayRef,
            Arc::new(Float64Array::from(age)) as ArrayRef,
            Arc::new(Float64Array::from(spend)) as ArrayRef,
            Arc::new(Float64Array::from(visits)) as ArrayRef,
        ],
    )?)
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging(LoggingConfig::development())?;

    let config = FidelityConfig::from_json(
        r#"{
            "binning": {"max_bins": 500, "estimators": ["fd", "doane", "sturges"]},
            "reducer": {"components": {"type": "fixed", "value": 2}}
        }"#,
    )?;

    let train = customers(12_000, 1, 0.5)?;
    let synthetic = customers(8_000, 2, 0.45)?;
    println!("=== Fidelity Audit ===\n");
    println!(
        "train rows: {}, synthetic rows: {}",
        train.num_rows(),
        synthetic.num_rows()
    );

    let (train, synthetic) = downsample_to_common_size(&train, &synthetic, config.sample_seed)?;
    println!("after down-sampling: {} rows each\n", train.num_rows());

    // Categorical field
    let real_plans = categorical_distribution(train.column(0))?;
    let fake_plans = categorical_distribution(synthetic.column(0))?;
    println!("plan distribution (train):");
    for (label, share) in real_plans.iter() {
        println!("  {label:>6}: {:5.1}% ({} rows)", share.percentage, share.count);
    }
    println!(
        "plan distance: {:.4}\n",
        distribution_distance(&real_plans.percentages(), &fake_plans.percentages())?
    );

    // Numeric fields, compared in PCA space
    let projection = config.reducer().fit(&numeric_columns(&train)?)?;
    let train_pcs = projection.apply(&numeric_columns(&train)?)?;
    let synthetic_pcs = projection.apply(&numeric_columns(&synthetic)?)?;

    for (name, ratio) in projection
        .component_names()
        .iter()
        .zip(projection.explained_variance_ratio())
    {
        let comparison = match numeric_distribution_distance(
            &numeric_values(&train_pcs, name)?,
            &numeric_values(&synthetic_pcs, name)?,
            &config.binning,
        )
        .with_context(|| format!("comparing {name}"))
        {
            Ok(comparison) => comparison,
            Err(e) if e.is_field_level() => {
                println!("skipping {name}: {e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        println!(
            "{name}: explains {:4.1}% of variance, {} bins via {:?}, distance {:.4}",
            ratio * 100.0,
            comparison.edges.num_bins(),
            comparison.edges.selection,
            comparison.distance
        );
    }

    Ok(())
}
