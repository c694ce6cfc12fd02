//! # FinGuard Core
//!
//! Shared data model and infrastructure for the FinGuard risk engine.
//!
//! This crate provides:
//! - Transaction and risk-analysis record types
//! - Error taxonomy and `Result` alias
//! - Unified configuration with deployment presets
//! - Fallible timestamp parsing
//! - Logging setup

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod logging;
pub mod time;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{ArchiveConfig, FinGuardConfig, GateConfig, StoreConfig};
    pub use crate::error::{FinGuardError, Result};
    pub use crate::time::parse_timestamp;
    pub use crate::types::{
        Decision, RiskAnalysis, RiskLevel, RiskSignal, RiskTrend, Transaction, Verdict,
    };
}

/// Version information.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let _level = RiskLevel::Low;
        let _trend = RiskTrend::Stable;
        let _verdict = Verdict::Legitimate;
    }

    #[test]
    fn test_version() {
        assert!(!crate::version::VERSION.is_empty());
    }
}
