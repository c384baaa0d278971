//! Privacy checks: detection of synthetic rows that reproduce training rows verbatim.
//!
//! A synthetic row that exactly matches a real training row is a memorization,
//! the most direct privacy leak a generator can commit. [`RowCanonicalizer`]
//! turns rows into comparable keys and [`count_memorized_rows`] counts the
//! distinct keys two datasets share.

mod canonical;
mod memorization;

pub use canonical::RowCanonicalizer;
pub use memorization::{count_memorized_rows, memorization_report, MemorizationReport};
