//! # FinGuard Health
//!
//! Financial health scoring over a user's risk history, plus the archive
//! of high-risk analyses.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alerts;
pub mod health;

pub use alerts::AlertArchive;
pub use health::{HealthScore, HealthScorer, HealthStatus};
