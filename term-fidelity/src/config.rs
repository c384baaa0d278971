//! Configuration for a fidelity audit.
//!
//! [`FidelityConfig`] bundles the tunables of every component. All fields have
//! defaults, so a JSON document only needs to name what it changes:
//!
//! ```rust
//! use term_fidelity::config::FidelityConfig;
//!
//! let config = FidelityConfig::from_json(r#"{"binning": {"max_bins": 200}}"#).unwrap();
//! assert_eq!(config.binning.max_bins, 200);
//! assert_eq!(config.sample_seed, 333);
//! ```

use serde::{Deserialize, Serialize};

use crate::binning::{AdaptiveBinner, BinningConfig};
use crate::error::{ErrorContext, FidelityError, Result};
use crate::reduction::{DimensionalityReducer, ReducerConfig};
use crate::sampling::DEFAULT_SAMPLE_SEED;

/// Settings shared by the components of one audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FidelityConfig {
    /// Adaptive binner settings.
    pub binning: BinningConfig,
    /// Dimensionality reducer settings.
    pub reducer: ReducerConfig,
    /// Seed for down-sampling the larger dataset.
    pub sample_seed: u64,
}

impl Default for FidelityConfig {
    fn default() -> Self {
        Self {
            binning: BinningConfig::default(),
            reducer: ReducerConfig::default(),
            sample_seed: DEFAULT_SAMPLE_SEED,
        }
    }
}

impl FidelityConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FidelityError::configuration(format!("invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces the binning settings.
    pub fn with_binning(mut self, binning: BinningConfig) -> Self {
        self.binning = binning;
        self
    }

    /// Replaces the reducer settings.
    pub fn with_reducer(mut self, reducer: ReducerConfig) -> Self {
        self.reducer = reducer;
        self
    }

    /// Sets the down-sampling seed.
    pub fn with_sample_seed(mut self, seed: u64) -> Self {
        self.sample_seed = seed;
        self
    }

    /// Validates every component's settings.
    pub fn validate(&self) -> Result<()> {
        self.binning.validate().context("binning")?;
        self.reducer.validate().context("reducer")
    }

    /// Builds a binner from these settings.
    pub fn binner(&self) -> AdaptiveBinner {
        AdaptiveBinner::new(self.binning.clone())
    }

    /// Builds a reducer from these settings.
    pub fn reducer(&self) -> DimensionalityReducer {
        DimensionalityReducer::new(self.reducer.clone())
    }
}
