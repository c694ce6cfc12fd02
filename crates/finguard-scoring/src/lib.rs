//! # FinGuard Scoring
//!
//! Layered transaction risk analysis and the decision gate.
//!
//! The engine blends four scoring layers over a profile snapshot:
//! rule checks, a statistical deviation test, a simulated learned model,
//! and behavioral rolling-window checks. Layer outputs are fused into a
//! single bounded score, scaled by the user's adaptive sensitivity, and
//! explained through a per-signal breakdown, a dominant-signal tag, and a
//! counterfactual.
//!
//! The decision gate maps a finished analysis (plus session context) onto
//! an `APPROVED` / `VERIFICATION_REQUIRED` / `BLOCKED` outcome.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decision;
pub mod engine;

pub use decision::{DecisionGate, GateOutcome, SessionContext};
pub use engine::ScoringEngine;
