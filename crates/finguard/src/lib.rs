//! # FinGuard
//!
//! Umbrella crate for the FinGuard transaction risk engine. Re-exports the
//! component crates and provides [`RiskPipeline`], the end-to-end
//! score-decide-commit flow most hosts want.
//!
//! # Quick start
//!
//! ```rust
//! use finguard::prelude::*;
//!
//! let pipeline = RiskPipeline::new(FinGuardConfig::development()).unwrap();
//! let txn = Transaction::new("T1", "U1", 120.0)
//!     .with_merchant("Amazon")
//!     .with_location("New York, NY")
//!     .with_timestamp("2026-02-22 10:00:00");
//!
//! let outcome = pipeline.process(&txn);
//! assert!(outcome.analysis.final_risk_score <= 100.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use finguard_core as core;
pub use finguard_health as health;
pub use finguard_profile as profile;
pub use finguard_scoring as scoring;

pub mod pipeline;

pub use pipeline::{RiskPipeline, TransactionOutcome};

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::pipeline::{RiskPipeline, TransactionOutcome};
    pub use finguard_core::config::{FinGuardConfig, GateConfig, StoreConfig};
    pub use finguard_core::error::{FinGuardError, Result};
    pub use finguard_core::types::{
        Decision, RiskAnalysis, RiskLevel, RiskSignal, RiskTrend, Transaction, Verdict,
    };
    pub use finguard_health::{AlertArchive, HealthScore, HealthScorer, HealthStatus};
    pub use finguard_profile::{ProfileSnapshot, ProfileStore, UserProfile};
    pub use finguard_scoring::{DecisionGate, GateOutcome, ScoringEngine, SessionContext};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
