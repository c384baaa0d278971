//! Logging setup for binaries that run fidelity audits.
//!
//! The library itself only emits `tracing` spans and events: one span per public
//! operation, `debug` events for estimator decisions and sampling, and a `warn`
//! when the binner has to cap the bin count. Nothing is printed until the
//! application installs a subscriber, which [`init_logging`] does.
//!
//! ```rust,no_run
//! use term_fidelity::logging::{init_logging, LoggingConfig};
//!
//! init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
//! ```

use tracing::Level;

/// Configuration for the `tracing-subscriber` registry.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the application
    pub level: Level,
    /// Log level for `term_fidelity` spans and events
    pub fidelity_level: Level,
    /// Whether to use JSON output format
    pub json_format: bool,
    /// Environment filter override
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            fidelity_level: Level::INFO,
            json_format: false,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Creates a configuration for production use: JSON, warnings only.
    pub fn production() -> Self {
        Self {
            level: Level::WARN,
            fidelity_level: Level::WARN,
            json_format: true,
            env_filter: None,
        }
    }

    /// Creates a configuration for development use, showing estimator decisions.
    pub fn development() -> Self {
        Self {
            level: Level::INFO,
            fidelity_level: Level::DEBUG,
            json_format: false,
            env_filter: None,
        }
    }

    /// Sets the log level for the application.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the log level for `term_fidelity`.
    pub fn with_fidelity_level(mut self, level: Level) -> Self {
        self.fidelity_level = level;
        self
    }

    /// Sets whether to use JSON output format.
    pub fn with_json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    /// Sets a custom environment filter.
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Builds the environment filter string.
    pub fn env_filter(&self) -> String {
        if let Some(ref filter) = self.env_filter {
            filter.clone()
        } else {
            format!(
                "{},term_fidelity={}",
                self.level.as_str().to_lowercase(),
                self.fidelity_level.as_str().to_lowercase()
            )
        }
    }
}

/// Installs a global subscriber. `RUST_LOG` takes precedence over the config.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

    let fmt_layer = if config.json_format {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
