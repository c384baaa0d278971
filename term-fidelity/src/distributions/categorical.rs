//! Categorical distribution extraction.

use arrow::array::Array;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

use super::divergence::distribution_distance;
use crate::error::Result;

/// Count and percentage of one category label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    /// Occurrences of the label.
    pub count: u64,
    /// `count / total non-null count × 100`.
    pub percentage: f64,
}

/// Distribution of a categorical column over its observed labels.
///
/// Both the absolute count and the percentage of each label are kept, so
/// consumers that need counts do not have to reconstruct them from rounded
/// percentages. Labels that never occur are absent rather than present with 0.
/// Percentages sum to 100 (within floating tolerance) whenever the source
/// column had at least one non-null value; otherwise the distribution is empty.
///
/// # Example
///
/// ```rust
/// use term_fidelity::distributions::CategoricalDistribution;
///
/// let dist = CategoricalDistribution::from_values(vec![Some("a"), Some("a"), Some("b"), None]);
/// assert_eq!(dist.total_count(), 3);
/// assert_eq!(dist.count("a"), Some(2));
/// assert!((dist.percentage("b").unwrap() - 100.0 / 3.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoricalDistribution {
    shares: BTreeMap<String, CategoryShare>,
    total_count: u64,
}

impl CategoricalDistribution {
    /// Builds a distribution from optional labels; `None` is a null and is skipped.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for value in values.into_iter().flatten() {
            *counts.entry(value.into()).or_insert(0) += 1;
        }
        Self::from_counts(counts)
    }

    /// Builds a distribution from label counts. Zero counts are dropped.
    pub fn from_counts(counts: BTreeMap<String, u64>) -> Self {
        let total_count: u64 = counts.values().sum();
        let shares = counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(label, count)| {
                let percentage = count as f64 / total_count as f64 * 100.0;
                (label, CategoryShare { count, percentage })
            })
            .collect();

        Self {
            shares,
            total_count,
        }
    }

    /// Builds a distribution from an Arrow column of any type.
    ///
    /// Labels are the values' display form, so `Int64(3)` becomes `"3"`.
    pub fn from_array(column: &dyn Array) -> Result<Self> {
        let formatter = ArrayFormatter::try_new(column, &FormatOptions::default())?;
        let labels = (0..column.len()).map(|i| {
            if column.is_null(i) {
                None
            } else {
                Some(formatter.value(i).to_string())
            }
        });
        Ok(Self::from_values(labels))
    }

    /// Returns the share of `label`, if it occurs.
    pub fn get(&self, label: &str) -> Option<&CategoryShare> {
        self.shares.get(label)
    }

    /// Returns the percentage of `label`, if it occurs.
    pub fn percentage(&self, label: &str) -> Option<f64> {
        self.get(label).map(|share| share.percentage)
    }

    /// Returns the count of `label`, if it occurs.
    pub fn count(&self, label: &str) -> Option<u64> {
        self.get(label).map(|share| share.count)
    }

    /// Number of non-null values the distribution was built from.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// Returns true when the source column had no non-null values.
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Iterates labels and their shares in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryShare)> {
        self.shares.iter().map(|(label, share)| (label.as_str(), share))
    }

    /// Returns the plain label → percentage mapping.
    pub fn percentages(&self) -> BTreeMap<String, f64> {
        self.shares
            .iter()
            .map(|(label, share)| (label.clone(), share.percentage))
            .collect()
    }

    /// Jensen–Shannon distance to another categorical distribution.
    pub fn distance(&self, other: &CategoricalDistribution) -> Result<f64> {
        distribution_distance(&self.percentages(), &other.percentages())
    }
}

/// Converts a categorical column into a label → percentage distribution.
///
/// Nulls are ignored; percentages are relative to the non-null count.
#[instrument(skip_all, fields(len = column.len(), nulls = column.null_count()))]
pub fn categorical_distribution(column: &dyn Array) -> Result<CategoricalDistribution> {
    CategoricalDistribution::from_array(column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FidelityError;
    use arrow::array::{BooleanArray, Int64Array, StringArray};

    #[test]
    fn test_percentages_from_string_column() {
        let column = StringArray::from(vec![
            "bar", "bar", "baz", "baz", "barf", "barf", "barf", "barf",
        ]);
        let dist = categorical_distribution(&column).unwrap();

        assert_eq!(dist.percentage("bar"), Some(25.0));
        assert_eq!(dist.percentage("baz"), Some(25.0));
        assert_eq!(dist.percentage("barf"), Some(50.0));
        assert_eq!(dist.count("barf"), Some(4));
        assert_eq!(dist.len(), 3);
    }

    #[test]
    fn test_nulls_are_excluded() {
        let column = StringArray::from(vec![Some("x"), None, Some("y"), None]);
        let dist = categorical_distribution(&column).unwrap();

        assert_eq!(dist.total_count(), 2);
        assert_eq!(dist.percentage("x"), Some(50.0));
        assert_eq!(dist.percentage("y"), Some(50.0));
        let total: f64 = dist.percentages().values().sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_and_boolean_labels() {
        let ints = Int64Array::from(vec![1, 1, 2]);
        let dist = categorical_distribution(&ints).unwrap();
        assert_eq!(dist.count("1"), Some(2));

        let bools = BooleanArray::from(vec![true, false, false, false]);
        let dist = categorical_distribution(&bools).unwrap();
        assert_eq!(dist.percentage("false"), Some(75.0));
    }

    #[test]
    fn test_all_null_column_is_empty() {
        let column = StringArray::from(vec![None::<&str>, None]);
        let dist = categorical_distribution(&column).unwrap();
        assert!(dist.is_empty());
        assert_eq!(dist.total_count(), 0);

        let other = CategoricalDistribution::from_values(vec![Some("a")]);
        assert!(matches!(
            dist.distance(&other),
            Err(FidelityError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_zero_counts_are_omitted() {
        let counts = BTreeMap::from([("a".to_string(), 3), ("b".to_string(), 0)]);
        let dist = CategoricalDistribution::from_counts(counts);
        assert_eq!(dist.len(), 1);
        assert_eq!(dist.get("b"), None);
        assert_eq!(dist.percentage("a"), Some(100.0));
    }

    #[test]
    fn test_distance_between_columns() {
        let train = CategoricalDistribution::from_values(vec![Some("a"), Some("b")]);
        let synth = CategoricalDistribution::from_values(vec![Some("a"), Some("b")]);
        assert_eq!(train.distance(&synth).unwrap(), 0.0);

        let shifted = CategoricalDistribution::from_values(vec![Some("c")]);
        assert!((train.distance(&shifted).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_serde_roundtrip_keeps_counts() {
        let dist = CategoricalDistribution::from_values(vec![Some("a"), Some("a"), Some("b")]);
        let json = serde_json::to_string(&dist).unwrap();
        let back: CategoricalDistribution = serde_json::from_str(&json).unwrap();
        assert_eq!(back.count("a"), Some(2));
        assert_eq!(back.total_count(), 3);
    }
}
