//! Profile types and data structures.

use crate::rolling::RollingMetrics;
use chrono::NaiveDateTime;
use finguard_core::types::{RiskSignal, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Lower bound for the adaptive weight factor.
pub const MIN_ADAPTIVE_WEIGHT: f64 = 0.7;
/// Upper bound for the adaptive weight factor.
pub const MAX_ADAPTIVE_WEIGHT: f64 = 2.5;

// ============================================================================
// Window entries
// ============================================================================

/// One committed transaction in the recent rolling window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEntry {
    /// Parsed transaction time.
    pub time: NaiveDateTime,
    /// Transaction amount.
    pub amount: f64,
    /// Merchant name.
    pub merchant: String,
    /// Risk score the transaction was committed with.
    pub risk_score: f64,
}

/// One committed transaction in the 7-day window. Only the amount survives;
/// this window exists solely for the 7-day average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyEntry {
    /// Parsed transaction time.
    pub time: NaiveDateTime,
    /// Transaction amount.
    pub amount: f64,
}

// ============================================================================
// Audit history
// ============================================================================

/// One entry of the append-only risk history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEvent {
    /// Raw timestamp of the scored transaction.
    pub timestamp: String,
    /// Final risk score.
    pub score: f64,
    /// Transaction amount.
    pub amount: f64,
    /// Merchant name.
    pub merchant: String,
}

/// One entry of the append-only session risk timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Raw timestamp of the scored transaction.
    pub timestamp: String,
    /// Final risk score.
    pub score: f64,
    /// Dominant-signal label from the analysis.
    pub primary_tag: String,
    /// Confidence score from the analysis.
    pub confidence: f64,
    /// Per-signal attribution from the analysis.
    pub breakdown: BTreeMap<RiskSignal, f64>,
    /// Counterfactual explanation from the analysis.
    pub counterfactual: String,
}

/// One entry of the append-only feedback history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Transaction the verdict referred to.
    pub transaction_id: String,
    /// Raw timestamp the feedback carried.
    pub timestamp: String,
    /// Confirmed verdict.
    pub verdict: Verdict,
    /// Description of the state change that was applied.
    pub effect: String,
}

// ============================================================================
// User profile
// ============================================================================

/// Evolving behavioral profile for a single user.
///
/// Created lazily on first reference and retained for the process lifetime.
/// All collections are owned, so `clone()` yields a fully independent deep
/// copy suitable for simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User this profile belongs to.
    pub user_id: String,

    // Cumulative statistics.
    /// Lifetime transaction count.
    pub transaction_count: u64,
    /// Lifetime total spend.
    pub total_amount: f64,
    /// Lifetime average spend (total / count).
    pub average_spending: f64,
    /// Every location seen in the user's history.
    pub location_history: BTreeSet<String>,
    /// Transaction count per merchant.
    pub merchant_frequency: BTreeMap<String, u64>,
    /// Total spend per category.
    pub category_spend: BTreeMap<String, f64>,
    /// Raw timestamp of the most recent transaction.
    pub last_transaction_time: Option<String>,

    // Rolling windows. The recent window retains entries within one hour of
    // its own latest entry, pruned from the front on every ingest.
    /// Recent rolling window.
    pub recent_window: VecDeque<WindowEntry>,
    /// 7-day window feeding the 7-day average amount.
    pub weekly_window: VecDeque<WeeklyEntry>,

    /// Current account balance; decremented on every ingest.
    pub balance: f64,

    // Adaptive state.
    /// Per-user sensitivity multiplier, bounded to [0.7, 2.5].
    pub adaptive_weight_factor: f64,
    /// Locations confirmed legitimate (a scoring hint, not a bypass).
    pub trusted_locations: BTreeSet<String>,
    /// Merchants confirmed legitimate (a scoring hint, not a bypass).
    pub trusted_merchants: BTreeSet<String>,
    /// High-risk transactions seen since the counter was last reset.
    pub suspicious_txn_count: u32,
    /// End of the active cooling-off period, if any.
    pub cooling_off_until: Option<NaiveDateTime>,

    // Append-only audit history; never pruned or reordered.
    /// Scored-transaction history.
    pub risk_history: Vec<RiskEvent>,
    /// Timeline of full analysis summaries.
    pub session_risk_timeline: Vec<TimelineEntry>,
    /// Applied feedback history.
    pub feedback_history: Vec<FeedbackRecord>,

    // Session aggregates, recomputed on every ingest.
    /// Mean of the last <=10 recent-window risk scores.
    pub session_risk_score: f64,
    /// Session anomaly score in [0, 100].
    pub session_anomaly_score: f64,
}

impl UserProfile {
    /// Create a fresh profile with defaults.
    #[must_use]
    pub fn new(user_id: impl Into<String>, initial_balance: f64) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_count: 0,
            total_amount: 0.0,
            average_spending: 0.0,
            location_history: BTreeSet::new(),
            merchant_frequency: BTreeMap::new(),
            category_spend: BTreeMap::new(),
            last_transaction_time: None,
            recent_window: VecDeque::new(),
            weekly_window: VecDeque::new(),
            balance: initial_balance,
            adaptive_weight_factor: 1.0,
            trusted_locations: BTreeSet::new(),
            trusted_merchants: BTreeSet::new(),
            suspicious_txn_count: 0,
            cooling_off_until: None,
            risk_history: Vec::new(),
            session_risk_timeline: Vec::new(),
            feedback_history: Vec::new(),
            session_risk_score: 0.0,
            session_anomaly_score: 0.0,
        }
    }

    /// Scores of the last `n` risk-history entries.
    #[must_use]
    pub fn last_scores(&self, n: usize) -> Vec<f64> {
        let start = self.risk_history.len().saturating_sub(n);
        self.risk_history[start..].iter().map(|e| e.score).collect()
    }

    /// Whether a cooling-off period is active at `at`.
    #[must_use]
    pub fn is_cooling_off(&self, at: NaiveDateTime) -> bool {
        self.cooling_off_until.is_some_and(|until| at < until)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Point-in-time, fully independent copy of a profile plus its derived
/// rolling metrics.
///
/// Mutating a snapshot never affects the store; the scoring engine and the
/// simulation path operate exclusively on snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    /// Deep copy of the stored profile.
    pub profile: UserProfile,
    /// Rolling metrics derived at snapshot time.
    pub rolling: RollingMetrics,
}
