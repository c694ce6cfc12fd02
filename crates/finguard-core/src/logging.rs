//! Logging setup.
//!
//! Thin wrapper over `tracing-subscriber` so hosts get consistent output:
//! human-readable in development, JSON in production for log aggregation.

use serde::{Deserialize, Serialize};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default log level filter (overridden by `RUST_LOG`).
    pub level: String,
    /// Emit structured JSON output.
    pub structured: bool,
    /// Include caller file/line.
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            structured: false,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Development configuration.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            include_location: true,
            ..Self::default()
        }
    }

    /// Production configuration.
    #[must_use]
    pub fn production() -> Self {
        Self {
            structured: true,
            ..Self::default()
        }
    }

    /// Initialize the global subscriber. Safe to call more than once; later
    /// calls are no-ops.
    pub fn init(&self) {
        use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.clone()));

        let registry = tracing_subscriber::registry().with(filter);

        if self.structured {
            let layer = fmt::layer()
                .json()
                .with_file(self.include_location)
                .with_line_number(self.include_location);
            registry.with(layer).try_init().ok();
        } else {
            let layer = fmt::layer()
                .with_file(self.include_location)
                .with_line_number(self.include_location);
            registry.with(layer).try_init().ok();
        }
    }
}
