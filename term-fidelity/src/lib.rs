//! # Term Fidelity - Synthetic Data Auditing for Rust
//!
//! Term Fidelity measures how closely a synthetic tabular dataset follows the
//! real dataset it was trained on, and whether it leaks that training data.
//! Datasets are Arrow [`RecordBatch`](arrow::record_batch::RecordBatch)es and
//! every operation is a pure, synchronous computation over them.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Float64Array, StringArray};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use term_fidelity::prelude::*;
//!
//! # fn main() -> term_fidelity::error::Result<()> {
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("city", DataType::Utf8, false),
//!     Field::new("amount", DataType::Float64, false),
//! ]));
//! let train = RecordBatch::try_new(
//!     schema.clone(),
//!     vec![
//!         Arc::new(StringArray::from(vec!["oslo", "rome", "oslo", "lima"])) as ArrayRef,
//!         Arc::new(Float64Array::from(vec![1.0, 2.5, 3.0, 4.5])) as ArrayRef,
//!     ],
//! )?;
//! let synthetic = RecordBatch::try_new(
//!     schema,
//!     vec![
//!         Arc::new(StringArray::from(vec!["oslo", "rome", "rome", "lima"])) as ArrayRef,
//!         Arc::new(Float64Array::from(vec![1.0, 2.0, 3.5, 4.0])) as ArrayRef,
//!     ],
//! )?;
//!
//! // Privacy: rows copied verbatim from the training data.
//! assert_eq!(count_memorized_rows(&train, &synthetic)?, 1);
//!
//! // Fidelity of a categorical field.
//! let real = categorical_distribution(train.column(0))?;
//! let fake = categorical_distribution(synthetic.column(0))?;
//! let distance = distribution_distance(&real.percentages(), &fake.percentages())?;
//! assert!(distance > 0.0 && distance < 1.0);
//!
//! // Fidelity of a numeric field on shared, adaptively chosen bins.
//! let amounts = numeric_distribution_distance(
//!     &numeric_values(&train, "amount")?,
//!     &numeric_values(&synthetic, "amount")?,
//!     &BinningConfig::default(),
//! )?;
//! assert!(amounts.edges.as_slice().len() < DEFAULT_MAX_BINS);
//! # Ok(())
//! # }
//! ```
//!
//! ## Components
//!
//! - [`privacy`]: canonical row keys and counting of memorized rows.
//! - [`distributions`]: categorical distributions and the Jensen–Shannon distance.
//! - [`reduction`]: PCA fitted once and applied to both datasets.
//! - [`binning`]: histogram edges that stay under a bin ceiling even when
//!   Freedman–Diaconis explodes on outlier-heavy data.
//! - [`sampling`]: seeded down-sampling to a common row count.
//!
//! ## Logging
//!
//! Operations emit `tracing` spans and events and never print. Applications
//! install a subscriber, for example with [`logging::init_logging`].

pub mod binning;
pub mod columns;
pub mod config;
pub mod distributions;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod privacy;
pub mod reduction;
pub mod sampling;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
