//! Detecting synthetic rows copied verbatim from the training data.
//!
//! Run with:
//! ```bash
//! cargo run --example memorization_check
//! ```

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;
use term_fidelity::privacy::{memorization_report, RowCanonicalizer};

fn people(names: Vec<Option<&str>>, ages: Vec<i64>) -> Result<RecordBatch, arrow::error::ArrowError> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, true),
        Field::new("age", DataType::Int64, false),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(names)) as ArrayRef,
            Arc::new(Int64Array::from(ages)) as ArrayRef,
        ],
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Memorization Check ===\n");

    let train = people(
        vec![Some("Ada, L."), Some("Grace"), None, Some("Alan")],
        vec![36, 85, 40, 41],
    )?;
    let synthetic = people(
        vec![Some("Ada, L."), Some("Grace"), None, Some("Edsger"), Some("Grace")],
        vec![36, 84, 40, 72, 84],
    )?;

    let canonicalizer = RowCanonicalizer::new(&train.schema());
    println!("canonical row keys (columns {:?}):", canonicalizer.columns());
    for key in canonicalizer.keys(&synthetic)? {
        println!("  {key}");
    }

    let report = memorization_report(&train, &synthetic)?;
    println!(
        "\n{} of {} distinct synthetic rows appear in the training data ({:.1}%)",
        report.memorized_rows,
        report.synthetic_distinct_rows,
        report.memorized_fraction() * 100.0
    );
    if !report.is_clean() {
        println!("synthetic data leaks training rows");
    }

    Ok(())
}
