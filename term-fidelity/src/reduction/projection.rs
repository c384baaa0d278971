//! Principal component projection fitted once and applied to many datasets.

use arrow::array::{ArrayRef, Float64Array};
use arrow::compute::concat_batches;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use nalgebra::{DMatrix, SymmetricEigen};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::columns::dense_values;
use crate::error::{FidelityError, Result};

/// How many principal components a projection retains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ComponentSelection {
    /// Keep exactly this many components.
    Fixed(usize),
    /// Keep the fewest components whose cumulative explained-variance ratio
    /// reaches this threshold, in `(0, 1]`.
    VarianceExplained(f64),
}

impl Default for ComponentSelection {
    fn default() -> Self {
        ComponentSelection::Fixed(2)
    }
}

/// Configuration for [`DimensionalityReducer`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReducerConfig {
    /// Component retention rule.
    pub components: ComponentSelection,
}

impl ReducerConfig {
    /// Keeps a fixed number of components.
    pub fn fixed(num_components: usize) -> Self {
        Self {
            components: ComponentSelection::Fixed(num_components),
        }
    }

    /// Keeps enough components to explain `threshold` of the variance.
    pub fn variance_explained(threshold: f64) -> Self {
        Self {
            components: ComponentSelection::VarianceExplained(threshold),
        }
    }

    /// Checks the retention rule for values that can never be satisfied.
    pub fn validate(&self) -> Result<()> {
        match self.components {
            ComponentSelection::Fixed(0) => Err(FidelityError::configuration(
                "number of components must be at least 1",
            )),
            ComponentSelection::VarianceExplained(t) if !(t > 0.0 && t <= 1.0) => {
                Err(FidelityError::configuration(format!(
                    "variance-explained threshold must be in (0, 1], got {t}"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Fits principal component projections.
///
/// Components from two independently fitted projections live on unrelated
/// axes, so a comparison of train and synthetic data must fit once (on one
/// dataset or on the pooled data) and apply the resulting [`Projection`] to
/// both.
///
/// # Example
///
/// ```rust
/// use arrow::array::Float64Array;
/// use arrow::datatypes::{DataType, Field, Schema};
/// use arrow::record_batch::RecordBatch;
/// use std::sync::Arc;
/// use term_fidelity::reduction::{DimensionalityReducer, ReducerConfig};
///
/// let schema = Arc::new(Schema::new(vec![
///     Field::new("x", DataType::Float64, false),
///     Field::new("y", DataType::Float64, false),
/// ]));
/// let train = RecordBatch::try_new(
///     schema.clone(),
///     vec![
///         Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0, 4.0])),
///         Arc::new(Float64Array::from(vec![2.0, 4.1, 5.9, 8.0])),
///     ],
/// )
/// .unwrap();
/// let synth = RecordBatch::try_new(
///     schema,
///     vec![
///         Arc::new(Float64Array::from(vec![1.5, 3.5])),
///         Arc::new(Float64Array::from(vec![3.0, 7.0])),
///     ],
/// )
/// .unwrap();
///
/// let projection = DimensionalityReducer::new(ReducerConfig::fixed(1))
///     .fit_pooled(&[&train, &synth])
///     .unwrap();
/// let train_pc = projection.apply(&train).unwrap();
/// let synth_pc = projection.apply(&synth).unwrap();
/// assert_eq!(train_pc.num_rows(), 4);
/// assert_eq!(synth_pc.num_rows(), 2);
/// assert_eq!(synth_pc.schema().field(0).name(), "pc1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DimensionalityReducer {
    config: ReducerConfig,
}

impl DimensionalityReducer {
    /// Creates a reducer with the given configuration.
    pub fn new(config: ReducerConfig) -> Self {
        Self { config }
    }

    /// Returns the reducer configuration.
    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    /// Fits a projection on `batch`, whose columns must all be numeric.
    ///
    /// # Errors
    ///
    /// - [`FidelityError::InsufficientDimensionality`] with fewer than 2
    ///   columns, more requested components than columns, or fewer rows than
    ///   components
    /// - [`FidelityError::InvalidData`] for non-numeric columns, nulls, or
    ///   non-finite values
    #[instrument(skip_all, fields(rows = batch.num_rows(), columns = batch.num_columns()))]
    pub fn fit(&self, batch: &RecordBatch) -> Result<Projection> {
        self.config.validate()?;

        let schema = batch.schema();
        let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
        let num_columns = columns.len();
        let num_rows = batch.num_rows();

        if num_columns < 2 {
            return Err(FidelityError::InsufficientDimensionality {
                what: "numeric columns",
                required: 2,
                found: num_columns,
            });
        }
        if let ComponentSelection::Fixed(k) = self.config.components {
            if k > num_columns {
                return Err(FidelityError::InsufficientDimensionality {
                    what: "numeric columns",
                    required: k,
                    found: num_columns,
                });
            }
            check_rows(k, num_rows)?;
        }
        check_rows(1, num_rows)?;

        let data = column_data(batch, &columns)?;
        let (means, scales) = standardization(&data);
        let z = standardized_matrix(&data, &means, &scales, num_rows);

        let denom = (num_rows.saturating_sub(1)).max(1) as f64;
        let covariance = (z.transpose() * &z) / denom;
        let eigen = SymmetricEigen::new(covariance);

        let mut order: Vec<usize> = (0..num_columns).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let variances: Vec<f64> = order
            .iter()
            .map(|&i| eigen.eigenvalues[i].max(0.0))
            .collect();
        let total_variance: f64 = variances.iter().sum();
        let ratios: Vec<f64> = variances
            .iter()
            .map(|v| {
                if total_variance > 0.0 {
                    v / total_variance
                } else {
                    0.0
                }
            })
            .collect();

        let num_components = match self.config.components {
            ComponentSelection::Fixed(k) => k,
            ComponentSelection::VarianceExplained(threshold) => {
                let k = components_for_threshold(&ratios, threshold);
                check_rows(k, num_rows)?;
                k
            }
        };

        let components: Vec<Vec<f64>> = order
            .iter()
            .take(num_components)
            .map(|&i| oriented(eigen.eigenvectors.column(i).iter().copied().collect()))
            .collect();

        debug!(
            num_components,
            explained = ?&ratios[..num_components],
            "fitted projection"
        );

        Ok(Projection {
            columns,
            means,
            scales,
            components,
            explained_variance: variances[..num_components].to_vec(),
            explained_variance_ratio: ratios[..num_components].to_vec(),
        })
    }

    /// Fits a projection on the row-wise concatenation of `batches`.
    ///
    /// All batches must share the same schema.
    pub fn fit_pooled(&self, batches: &[&RecordBatch]) -> Result<Projection> {
        let first = batches
            .first()
            .ok_or_else(|| FidelityError::empty_input("no datasets to pool"))?;
        let schema = first.schema();
        let pooled = concat_batches(&schema, batches.iter().copied())?;
        self.fit(&pooled)
    }
}

/// A fitted standardize-then-rotate transform.
///
/// Apply it to every dataset that takes part in a comparison so their component
/// columns share axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    columns: Vec<String>,
    means: Vec<f64>,
    scales: Vec<f64>,
    /// Row `c` holds the loadings of component `c + 1`, aligned with `columns`.
    components: Vec<Vec<f64>>,
    explained_variance: Vec<f64>,
    explained_variance_ratio: Vec<f64>,
}

impl Projection {
    /// Input columns the projection was fitted on.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of retained components.
    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// Component loadings, most explanatory first.
    pub fn components(&self) -> &[Vec<f64>] {
        &self.components
    }

    /// Variance of the standardized data along each component.
    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    /// Share of total variance along each component.
    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }

    /// Output column names, `pc1` through `pcK`.
    pub fn component_names(&self) -> Vec<String> {
        (1..=self.num_components()).map(|c| format!("pc{c}")).collect()
    }

    /// Projects `batch` onto the fitted components.
    ///
    /// The batch must contain every fitted column (in any order); other columns
    /// are ignored. The output has the same row count and one `Float64` column
    /// per component.
    #[instrument(skip_all, fields(rows = batch.num_rows(), components = self.num_components()))]
    pub fn apply(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        self.check_shape()?;
        let schema = batch.schema();
        let missing: Vec<String> = self
            .columns
            .iter()
            .filter(|c| schema.index_of(c).is_err())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(FidelityError::schema_mismatch(missing, Vec::new()));
        }

        let num_rows = batch.num_rows();
        let data = column_data(batch, &self.columns)?;
        let z = standardized_matrix(&data, &self.means, &self.scales, num_rows);

        let fields: Vec<Field> = self
            .component_names()
            .into_iter()
            .map(|name| Field::new(name, DataType::Float64, false))
            .collect();

        let arrays: Vec<ArrayRef> = self
            .components
            .iter()
            .map(|loadings| {
                let scores: Vec<f64> = (0..num_rows)
                    .map(|row| {
                        loadings
                            .iter()
                            .enumerate()
                            .map(|(j, w)| z[(row, j)] * w)
                            .sum()
                    })
                    .collect();
                Arc::new(Float64Array::from(scores)) as ArrayRef
            })
            .collect();

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }

    /// Deserialized projections are not guaranteed to be consistent.
    fn check_shape(&self) -> Result<()> {
        let width = self.columns.len();
        if self.means.len() != width || self.scales.len() != width {
            return Err(FidelityError::invalid_data(format!(
                "projection has {width} columns but {} means and {} scales",
                self.means.len(),
                self.scales.len()
            )));
        }
        if let Some((c, loadings)) = self
            .components
            .iter()
            .enumerate()
            .find(|(_, loadings)| loadings.len() != width)
        {
            return Err(FidelityError::invalid_data(format!(
                "component pc{} has {} loadings, expected {width}",
                c + 1,
                loadings.len()
            )));
        }
        Ok(())
    }
}

/// Fits a projection keeping `num_components` components.
pub fn fit_projection(batch: &RecordBatch, num_components: usize) -> Result<Projection> {
    DimensionalityReducer::new(ReducerConfig::fixed(num_components)).fit(batch)
}

/// Applies a fitted projection to `batch`.
pub fn reduce_dimensions(projection: &Projection, batch: &RecordBatch) -> Result<RecordBatch> {
    projection.apply(batch)
}

fn check_rows(required: usize, found: usize) -> Result<()> {
    if found < required {
        return Err(FidelityError::InsufficientDimensionality {
            what: "rows",
            required,
            found,
        });
    }
    Ok(())
}

fn column_data(batch: &RecordBatch, columns: &[String]) -> Result<Vec<Vec<f64>>> {
    let schema = batch.schema();
    columns
        .iter()
        .map(|name| {
            let index = schema.index_of(name)?;
            dense_values(name, batch.column(index).as_ref())
        })
        .collect()
}

/// Population mean and standard deviation per column; constant columns get
/// scale 1 so they standardize to zeros.
fn standardization(data: &[Vec<f64>]) -> (Vec<f64>, Vec<f64>) {
    data.iter()
        .map(|values| {
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();
            let scale = if std > 0.0 && std.is_finite() { std } else { 1.0 };
            (mean, scale)
        })
        .unzip()
}

fn standardized_matrix(data: &[Vec<f64>], means: &[f64], scales: &[f64], rows: usize) -> DMatrix<f64> {
    DMatrix::from_fn(rows, data.len(), |i, j| (data[j][i] - means[j]) / scales[j])
}

fn components_for_threshold(ratios: &[f64], threshold: f64) -> usize {
    let mut cumulative = 0.0;
    for (i, ratio) in ratios.iter().enumerate() {
        cumulative += ratio;
        if cumulative >= threshold - 1e-12 {
            return i + 1;
        }
    }
    ratios.len().max(1)
}

/// Flips the eigenvector so its largest-magnitude loading is positive.
fn oriented(mut vector: Vec<f64>) -> Vec<f64> {
    let pivot = vector
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    if pivot < 0.0 {
        vector.iter_mut().for_each(|v| *v = -*v);
    }
    vector
}
