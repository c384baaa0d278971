//! Canonical row keys for exact-match comparison.

use arrow::array::Array;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use std::collections::BTreeSet;
use std::fmt::Write;

use crate::error::{FidelityError, Result};

/// Serializes rows into canonical CSV-style keys.
///
/// Columns are visited in lexicographic order of their names, so two datasets
/// with the same column set produce identical keys for identical rows even when
/// their column order differs. The key is a single CSV record without header:
///
/// - fields are separated by `,`
/// - a value containing `,`, `"`, `\r`, `\n`, or leading/trailing whitespace is
///   wrapped in double quotes with inner quotes doubled
/// - an empty string renders as `""` and a null renders as nothing, so the two
///   never collide
///
/// # Example
///
/// ```rust
/// use arrow::array::{Int64Array, StringArray};
/// use arrow::datatypes::{DataType, Field, Schema};
/// use arrow::record_batch::RecordBatch;
/// use std::sync::Arc;
/// use term_fidelity::privacy::RowCanonicalizer;
///
/// let schema = Arc::new(Schema::new(vec![
///     Field::new("name", DataType::Utf8, true),
///     Field::new("age", DataType::Int64, true),
/// ]));
/// let batch = RecordBatch::try_new(
///     schema.clone(),
///     vec![
///         Arc::new(StringArray::from(vec![Some("Doe, Jane")])),
///         Arc::new(Int64Array::from(vec![Some(42)])),
///     ],
/// )
/// .unwrap();
///
/// let canonicalizer = RowCanonicalizer::new(&schema);
/// assert_eq!(canonicalizer.key(&batch, 0).unwrap(), "42,\"Doe, Jane\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCanonicalizer {
    columns: Vec<String>,
}

impl RowCanonicalizer {
    /// Creates a canonicalizer whose reference ordering is the sorted column set
    /// of `schema`.
    pub fn new(schema: &Schema) -> Self {
        let mut columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
        columns.sort();
        Self { columns }
    }

    /// Returns the reference column ordering.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Verifies that `schema` has exactly the reference column set.
    pub fn check_schema(&self, schema: &Schema) -> Result<()> {
        let expected: BTreeSet<&str> = self.columns.iter().map(String::as_str).collect();
        let actual: BTreeSet<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();

        if expected == actual {
            return Ok(());
        }

        Err(FidelityError::schema_mismatch(
            expected.difference(&actual).map(|c| c.to_string()).collect(),
            actual.difference(&expected).map(|c| c.to_string()).collect(),
        ))
    }

    /// Returns the key of every row in `batch`, in row order.
    pub fn keys(&self, batch: &RecordBatch) -> Result<Vec<String>> {
        let row_formatter = self.row_formatter(batch)?;
        Ok((0..batch.num_rows())
            .map(|row| row_formatter.key(row))
            .collect())
    }

    /// Returns the key of a single row.
    pub fn key(&self, batch: &RecordBatch, row: usize) -> Result<String> {
        if row >= batch.num_rows() {
            return Err(FidelityError::invalid_data(format!(
                "row {row} out of bounds for batch with {} rows",
                batch.num_rows()
            )));
        }
        Ok(self.row_formatter(batch)?.key(row))
    }

    fn row_formatter<'a>(&self, batch: &'a RecordBatch) -> Result<RowFormatter<'a>> {
        self.check_schema(batch.schema().as_ref())?;

        let options = FormatOptions::default();
        let mut columns = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let index = batch.schema().index_of(name)?;
            let array = batch.column(index).as_ref();
            columns.push((array, ArrayFormatter::try_new(array, &options)?));
        }

        Ok(RowFormatter { columns })
    }
}

/// Formatters for one batch, resolved in reference column order.
struct RowFormatter<'a> {
    columns: Vec<(&'a dyn Array, ArrayFormatter<'a>)>,
}

impl RowFormatter<'_> {
    fn key(&self, row: usize) -> String {
        let mut key = String::new();
        let mut value = String::new();

        for (i, (array, formatter)) in self.columns.iter().enumerate() {
            if i > 0 {
                key.push(',');
            }
            if array.is_null(row) {
                continue;
            }

            value.clear();
            // Writing into a String cannot fail.
            let _ = write!(value, "{}", formatter.value(row));
            push_field(&mut key, &value);
        }

        key
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.contains([',', '"', '\r', '\n'])
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace)
}

fn push_field(out: &mut String, value: &str) {
    if needs_quotes(value) {
        out.push('"');
        for c in value.chars() {
            if c == '"' {
                out.push('"');
            }
            out.push(c);
        }
        out.push('"');
    } else {
        out.push_str(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field};
    use std::sync::Arc;

    fn two_string_columns(a: Vec<Option<&str>>, b: Vec<Option<&str>>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Utf8, true),
            Field::new("b", DataType::Utf8, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(a)),
                Arc::new(StringArray::from(b)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_plain_values_are_unquoted() {
        let batch = two_string_columns(vec![Some("x")], vec![Some("y")]);
        let canonicalizer = RowCanonicalizer::new(batch.schema().as_ref());
        assert_eq!(canonicalizer.key(&batch, 0).unwrap(), "x,y");
    }

    #[test]
    fn test_delimiter_inside_value_does_not_collide() {
        // ("x,y", "z") and ("x", "y,z") must not share a key.
        let batch = two_string_columns(vec![Some("x,y"), Some("x")], vec![Some("z"), Some("y,z")]);
        let canonicalizer = RowCanonicalizer::new(batch.schema().as_ref());
        let keys = canonicalizer.keys(&batch).unwrap();
        assert_eq!(keys[0], "\"x,y\",z");
        assert_eq!(keys[1], "x,\"y,z\"");
        assert_ne!(keys[0], keys[1]);
    }

    #[test]
    fn test_quotes_and_whitespace() {
        let batch = two_string_columns(vec![Some("say \"hi\"")], vec![Some(" padded")]);
        let canonicalizer = RowCanonicalizer::new(batch.schema().as_ref());
        assert_eq!(
            canonicalizer.key(&batch, 0).unwrap(),
            "\"say \"\"hi\"\"\",\" padded\""
        );
    }

    #[test]
    fn test_null_and_empty_string_differ() {
        let batch = two_string_columns(vec![None, Some("")], vec![Some("v"), Some("v")]);
        let canonicalizer = RowCanonicalizer::new(batch.schema().as_ref());
        let keys = canonicalizer.keys(&batch).unwrap();
        assert_eq!(keys[0], ",v");
        assert_eq!(keys[1], "\"\",v");
    }

    #[test]
    fn test_column_order_is_normalized() {
        let schema_ab = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Utf8, true),
            Field::new("b", DataType::Float64, true),
        ]));
        let schema_ba = Arc::new(Schema::new(vec![
            Field::new("b", DataType::Float64, true),
            Field::new("a", DataType::Utf8, true),
        ]));
        let ab = RecordBatch::try_new(
            schema_ab.clone(),
            vec![
                Arc::new(StringArray::from(vec!["k"])),
                Arc::new(Float64Array::from(vec![1.5])),
            ],
        )
        .unwrap();
        let ba = RecordBatch::try_new(
            schema_ba,
            vec![
                Arc::new(Float64Array::from(vec![1.5])),
                Arc::new(StringArray::from(vec!["k"])),
            ],
        )
        .unwrap();

        let canonicalizer = RowCanonicalizer::new(&schema_ab);
        assert_eq!(
            canonicalizer.key(&ab, 0).unwrap(),
            canonicalizer.key(&ba, 0).unwrap()
        );
    }

    #[test]
    fn test_schema_mismatch_is_reported() {
        let batch = two_string_columns(vec![Some("x")], vec![Some("y")]);
        let other = Schema::new(vec![Field::new("a", DataType::Utf8, true)]);
        let canonicalizer = RowCanonicalizer::new(&other);

        match canonicalizer.keys(&batch) {
            Err(FidelityError::SchemaMismatch {
                left_only,
                right_only,
            }) => {
                assert!(left_only.is_empty());
                assert_eq!(right_only, vec!["b".to_string()]);
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_row_out_of_bounds() {
        let batch = two_string_columns(vec![Some("x")], vec![Some("y")]);
        let canonicalizer = RowCanonicalizer::new(batch.schema().as_ref());
        assert!(matches!(
            canonicalizer.key(&batch, 1),
            Err(FidelityError::InvalidData(_))
        ));
    }
}
