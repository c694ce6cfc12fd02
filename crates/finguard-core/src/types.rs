//! Shared data model for the FinGuard risk engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder substituted for missing text fields.
pub const UNKNOWN: &str = "Unknown";

// ============================================================================
// Transaction
// ============================================================================

/// A financial transaction under evaluation.
///
/// Created by the ingestion collaborator and never mutated. Optional fields
/// may be absent on malformed input; accessors substitute documented
/// defaults so the scoring path stays total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    #[serde(default = "default_unknown")]
    pub id: String,
    /// User the transaction belongs to.
    #[serde(default = "default_unknown")]
    pub user_id: String,
    /// Transaction amount (non-negative).
    #[serde(default)]
    pub amount: Option<f64>,
    /// Merchant name.
    #[serde(default)]
    pub merchant: Option<String>,
    /// Spending category.
    #[serde(default)]
    pub category: Option<String>,
    /// Location the transaction originated from.
    #[serde(default)]
    pub location: Option<String>,
    /// Timestamp as received from ingestion (`YYYY-MM-DD HH:MM:SS` or ISO).
    #[serde(default)]
    pub timestamp: Option<String>,
}

fn default_unknown() -> String {
    UNKNOWN.to_string()
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            id: default_unknown(),
            user_id: default_unknown(),
            amount: None,
            merchant: None,
            category: None,
            location: None,
            timestamp: None,
        }
    }
}

impl Transaction {
    /// Create a transaction with the required identity and amount.
    #[must_use]
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, amount: f64) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            amount: Some(amount),
            ..Self::default()
        }
    }

    /// Set the merchant.
    #[must_use]
    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Amount with the missing-field default (0) applied and negative
    /// values clamped to zero.
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.amount.unwrap_or(0.0).max(0.0)
    }

    /// Merchant with the missing-field default applied.
    #[must_use]
    pub fn merchant(&self) -> &str {
        self.merchant.as_deref().unwrap_or(UNKNOWN)
    }

    /// Category with the missing-field default applied.
    #[must_use]
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(UNKNOWN)
    }

    /// Location with the missing-field default applied.
    #[must_use]
    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or(UNKNOWN)
    }

    /// Raw timestamp, if present.
    #[must_use]
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }
}

// ============================================================================
// Risk analysis
// ============================================================================

/// Named cause a risk score is attributed to.
///
/// Each scoring layer tags its own contributions at the point of
/// computation, so consumers never recover attribution from reason text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSignal {
    /// Amount deviates from the user's historical average.
    AmountDeviation,
    /// Burst of transactions in a short window.
    VelocitySpike,
    /// Sustained outflow over the 30-minute window.
    CumulativeOutflow,
    /// Outflow depleting a large share of the balance.
    BalanceDrain,
    /// Transaction toward a previously unseen location.
    NewBeneficiary,
    /// Elevated session-level anomaly score.
    SessionAnomaly,
}

impl std::fmt::Display for RiskSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AmountDeviation => "amount_deviation",
            Self::VelocitySpike => "velocity_spike",
            Self::CumulativeOutflow => "cumulative_outflow",
            Self::BalanceDrain => "balance_drain",
            Self::NewBeneficiary => "new_beneficiary",
            Self::SessionAnomaly => "session_anomaly",
        };
        write!(f, "{name}")
    }
}

/// Risk level classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Score <= 30.
    Low,
    /// 30 < score <= 60.
    Medium,
    /// Score > 60.
    High,
}

impl From<f64> for RiskLevel {
    fn from(score: f64) -> Self {
        match score {
            s if s <= 30.0 => RiskLevel::Low,
            s if s <= 60.0 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Direction of a user's risk relative to their recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTrend {
    /// Current score exceeds the last-5 average by more than 5.
    Increasing,
    /// Current score is within 5 of the last-5 average.
    Stable,
    /// Current score is more than 5 below the last-5 average.
    Decreasing,
}

impl std::fmt::Display for RiskTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Increasing => write!(f, "INCREASING"),
            Self::Stable => write!(f, "STABLE"),
            Self::Decreasing => write!(f, "DECREASING"),
        }
    }
}

/// Result of scoring one transaction against a profile snapshot.
///
/// Immutable once produced; the stable, typed contract consumed by the
/// decision gate, health scorer, alert archive, and explanation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    /// Transaction that was scored.
    pub transaction_id: String,
    /// Fused, calibrated risk score in [0, 100].
    pub final_risk_score: f64,
    /// How many independent signals corroborate the verdict, in [0, 100].
    pub confidence_score: f64,
    /// Classification of the final score.
    pub risk_level: RiskLevel,
    /// Human-readable label for the dominant signal.
    pub primary_tag: String,
    /// Per-signal contribution attribution (presentation, not fusion).
    pub risk_breakdown: BTreeMap<RiskSignal, f64>,
    /// Canned explanation of how the score would change hypothetically.
    pub counterfactual: String,
    /// Deduplicated descriptions of the rules that triggered.
    pub reasons: Vec<String>,
    /// Direction relative to the user's last five scores.
    pub risk_trend: RiskTrend,
    /// Average of the last five historical scores (current score when no
    /// history exists).
    pub last_5_avg_risk: f64,
}

// ============================================================================
// Feedback and decisions
// ============================================================================

/// Confirmed outcome reported back for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// The transaction was confirmed legitimate.
    Legitimate,
    /// The transaction was confirmed fraudulent.
    Fraud,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legitimate => write!(f, "LEGITIMATE"),
            Self::Fraud => write!(f, "FRAUD"),
        }
    }
}

/// Actionable verdict produced by the decision gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Let the transaction through.
    Approved,
    /// Hold pending additional verification.
    VerificationRequired,
    /// Refuse the transaction.
    Blocked,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "APPROVED"),
            Self::VerificationRequired => write!(f, "VERIFICATION_REQUIRED"),
            Self::Blocked => write!(f, "BLOCKED"),
        }
    }
}
