//! Decision gate.
//!
//! Maps a finished risk analysis, plus session-level context, onto an
//! actionable decision. Session overrides are checked before the score
//! ladder so a compromised session blocks even a low-scoring transaction.
//! The biometric challenge is simulated deterministically: it is triggered
//! at the configured threshold and fails only above the configured failure
//! score.

use finguard_core::config::GateConfig;
use finguard_core::types::{Decision, RiskAnalysis};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Session-level context evaluated ahead of the score ladder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Session anomaly score in [0, 100].
    pub anomaly_score: f64,
    /// The user reported being guided through this session by a caller.
    pub user_reported_guided: bool,
}

/// Outcome of gating one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateOutcome {
    /// The decision.
    pub decision: Decision,
    /// Whether a biometric challenge was issued.
    pub biometric_triggered: bool,
    /// Challenge result, when one was issued.
    pub biometric_verified: Option<bool>,
    /// Session-level reason that forced a block, if any.
    pub override_reason: Option<String>,
}

impl GateOutcome {
    fn plain(decision: Decision) -> Self {
        Self {
            decision,
            biometric_triggered: false,
            biometric_verified: None,
            override_reason: None,
        }
    }
}

/// Gate mapping analyses onto decisions.
#[derive(Debug, Clone)]
pub struct DecisionGate {
    config: GateConfig,
}

impl Default for DecisionGate {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}

impl DecisionGate {
    /// Create a gate.
    #[must_use]
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Evaluate one analysis in its session context.
    #[must_use]
    pub fn evaluate(&self, analysis: &RiskAnalysis, session: &SessionContext) -> GateOutcome {
        if session.user_reported_guided {
            let reason = "User reported being guided through the session".to_string();
            info!(transaction_id = %analysis.transaction_id, %reason, "session override");
            return GateOutcome {
                decision: Decision::Blocked,
                biometric_triggered: false,
                biometric_verified: None,
                override_reason: Some(reason),
            };
        }
        if session.anomaly_score > self.config.session_block_above {
            let reason = format!(
                "Session anomaly score {:.1} above {:.1}",
                session.anomaly_score, self.config.session_block_above
            );
            info!(transaction_id = %analysis.transaction_id, %reason, "session override");
            return GateOutcome {
                decision: Decision::Blocked,
                biometric_triggered: false,
                biometric_verified: None,
                override_reason: Some(reason),
            };
        }

        let score = analysis.final_risk_score;
        if score >= self.config.biometric_threshold {
            let verified = score <= self.config.verification_fail_above;
            let decision = if !verified {
                Decision::Blocked
            } else if score > self.config.block_above {
                Decision::Blocked
            } else if score > self.config.verify_above {
                Decision::VerificationRequired
            } else {
                Decision::Approved
            };
            info!(
                transaction_id = %analysis.transaction_id,
                score,
                verified,
                %decision,
                "biometric challenge issued"
            );
            return GateOutcome {
                decision,
                biometric_triggered: true,
                biometric_verified: Some(verified),
                override_reason: None,
            };
        }

        let decision = if score > self.config.block_above {
            Decision::Blocked
        } else if score > self.config.verify_above {
            Decision::VerificationRequired
        } else {
            Decision::Approved
        };
        GateOutcome::plain(decision)
    }
}
