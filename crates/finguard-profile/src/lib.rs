//! # FinGuard Profile
//!
//! Per-user behavioral profile store.
//!
//! This crate provides:
//! - `UserProfile`: cumulative spending statistics, rolling windows,
//!   adaptive sensitivity state, and append-only audit history
//! - `ProfileStore`: concurrent map of profiles with per-user mutual
//!   exclusion and copy-on-read snapshots
//! - Rolling-window metric derivation over 5/15/30-minute and 1-hour
//!   sub-windows plus a 7-day baseline
//! - The feedback controller adjusting per-user sensitivity from confirmed
//!   outcomes under safety bounds and cooling-off

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod feedback;
pub mod profile;
pub mod rolling;
pub mod store;

pub use feedback::FeedbackEffect;
pub use profile::{
    FeedbackRecord, ProfileSnapshot, RiskEvent, TimelineEntry, UserProfile, WindowEntry,
    MAX_ADAPTIVE_WEIGHT, MIN_ADAPTIVE_WEIGHT,
};
pub use rolling::RollingMetrics;
pub use store::ProfileStore;
