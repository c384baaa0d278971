//! Error types for the Term fidelity library.
//!
//! Every fallible operation in this crate returns [`Result`], whose error side is
//! [`FidelityError`]. The variants are usage errors: the inputs handed to an
//! operation cannot produce a meaningful answer, so the caller is told instead of
//! receiving a zero or NaN that could pass for a real score.

use thiserror::Error;

/// The main error type for the Term fidelity library.
#[derive(Error, Debug)]
pub enum FidelityError {
    /// Two datasets being compared do not share the same column set.
    #[error("Schema mismatch: columns only on the left {left_only:?}, only on the right {right_only:?}")]
    SchemaMismatch {
        /// Columns present only in the first dataset
        left_only: Vec<String>,
        /// Columns present only in the second dataset
        right_only: Vec<String>,
    },

    /// An operation received a column or dataset with zero usable values.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Fewer numeric columns or rows than the requested number of components.
    #[error("Insufficient dimensionality: {what} requires at least {required}, found {found}")]
    InsufficientDimensionality {
        /// What was counted (e.g. "numeric columns", "rows")
        what: &'static str,
        /// Minimum count needed
        required: usize,
        /// Count actually present
        found: usize,
    },

    /// Input values that the operation cannot interpret (nulls in numeric
    /// input, non-finite numbers, negative weights, non-numeric columns).
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// A type alias for `Result<T, FidelityError>`.
///
/// # Examples
///
/// ```rust
/// use term_fidelity::error::Result;
///
/// fn audit() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, FidelityError>;

impl FidelityError {
    /// Creates an empty input error.
    pub fn empty_input(what: impl Into<String>) -> Self {
        Self::EmptyInput(what.into())
    }

    /// Creates an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a schema mismatch error, sorting both column lists.
    pub fn schema_mismatch(mut left_only: Vec<String>, mut right_only: Vec<String>) -> Self {
        left_only.sort();
        right_only.sort();
        Self::SchemaMismatch {
            left_only,
            right_only,
        }
    }

    /// Returns true for errors the caller can recover from by skipping the field
    /// being processed.
    pub fn is_field_level(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput(_) | Self::InvalidData(_) | Self::InsufficientDimensionality { .. }
        )
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<FidelityError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| prefix(msg, e.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| prefix(&f(), e.into()))
    }
}

/// Prefixes the message of message-carrying variants, keeping the variant so
/// callers can still match on the error kind.
fn prefix(msg: &str, err: FidelityError) -> FidelityError {
    match err {
        FidelityError::EmptyInput(inner) => FidelityError::EmptyInput(format!("{msg}: {inner}")),
        FidelityError::InvalidData(inner) => FidelityError::InvalidData(format!("{msg}: {inner}")),
        FidelityError::Configuration(inner) => {
            FidelityError::Configuration(format!("{msg}: {inner}"))
        }
        other => other,
    }
}
