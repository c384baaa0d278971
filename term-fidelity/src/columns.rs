//! Helpers for pulling numeric data out of Arrow record batches.

use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;

use crate::error::{FidelityError, Result};

/// Projects `batch` onto its numeric columns, keeping their order.
///
/// Use this to satisfy the numeric-only precondition of
/// [`crate::reduction::DimensionalityReducer::fit`].
pub fn numeric_columns(batch: &RecordBatch) -> Result<RecordBatch> {
    let indices: Vec<usize> = batch
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, field)| field.data_type().is_numeric())
        .map(|(i, _)| i)
        .collect();
    Ok(batch.project(&indices)?)
}

/// Returns the non-null values of a numeric column as `f64`, in row order.
///
/// Integer, float and decimal columns are cast to `Float64`.
pub fn numeric_values(batch: &RecordBatch, column: &str) -> Result<Vec<f64>> {
    let array = batch.column(batch.schema().index_of(column)?);
    let values = to_f64(column, array.as_ref())?;
    Ok(values.into_iter().flatten().collect())
}

/// Returns every value of a numeric column, rejecting nulls and non-finite values.
pub(crate) fn dense_values(column: &str, array: &dyn Array) -> Result<Vec<f64>> {
    let values = to_f64(column, array)?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(FidelityError::invalid_data(format!(
                "column '{column}' has non-finite value {v} at row {row}"
            ))),
            None => Err(FidelityError::invalid_data(format!(
                "column '{column}' has a null at row {row}"
            ))),
        })
        .collect()
}

fn to_f64(column: &str, array: &dyn Array) -> Result<Vec<Option<f64>>> {
    if !array.data_type().is_numeric() {
        return Err(FidelityError::invalid_data(format!(
            "column '{column}' has non-numeric type {}",
            array.data_type()
        )));
    }
    let casted = cast(array, &DataType::Float64)?;
    Ok(casted.as_primitive::<Float64Type>().iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float32Array, Int32Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn mixed_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("label", DataType::Utf8, true),
            Field::new("score", DataType::Float32, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int32Array::from(vec![1, 2, 3])),
                Arc::new(StringArray::from(vec![Some("a"), None, Some("c")])),
                Arc::new(Float32Array::from(vec![Some(0.5), None, Some(2.0)])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_numeric_columns_drops_strings() {
        let numeric = numeric_columns(&mixed_batch()).unwrap();
        let names: Vec<_> = numeric
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names, vec!["id", "score"]);
        assert_eq!(numeric.num_rows(), 3);
    }

    #[test]
    fn test_numeric_values_skips_nulls() {
        let batch = mixed_batch();
        assert_eq!(numeric_values(&batch, "id").unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(numeric_values(&batch, "score").unwrap(), vec![0.5, 2.0]);
    }

    #[test]
    fn test_numeric_values_rejects_strings() {
        let batch = mixed_batch();
        assert!(matches!(
            numeric_values(&batch, "label"),
            Err(FidelityError::InvalidData(_))
        ));
        assert!(matches!(
            numeric_values(&batch, "missing"),
            Err(FidelityError::Arrow(_))
        ));
    }

    #[test]
    fn test_dense_values_rejects_nulls() {
        let batch = mixed_batch();
        let err = dense_values("score", batch.column(2).as_ref()).unwrap_err();
        assert!(err.to_string().contains("null at row 1"));
    }
}
