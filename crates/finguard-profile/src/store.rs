//! Concurrent profile store.
//!
//! Profiles live behind a `RwLock<HashMap>` of per-user `Arc<Mutex<_>>`
//! entries: the outer lock is held only to resolve a user id, the inner
//! mutex serializes all mutation for one user. Readers get copy-on-read
//! snapshots and never observe a profile mid-update.

use crate::feedback::{self, FeedbackEffect};
use crate::profile::{FeedbackRecord, ProfileSnapshot, RiskEvent, TimelineEntry, UserProfile, WeeklyEntry, WindowEntry};
use crate::rolling::{self, RollingMetrics};
use chrono::Duration;
use finguard_core::config::StoreConfig;
use finguard_core::error::{FinGuardError, Result};
use finguard_core::time;
use finguard_core::types::{RiskAnalysis, Transaction, Verdict, UNKNOWN};
use hashbrown::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

/// Thread-safe store of per-user behavioral profiles.
///
/// Profiles are created lazily on first reference and retained for the
/// process lifetime.
pub struct ProfileStore {
    profiles: RwLock<HashMap<String, Arc<Mutex<UserProfile>>>>,
    config: StoreConfig,
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl ProfileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Number of profiles currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.read().unwrap().len()
    }

    /// Whether the store holds no profiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All known user ids, in insertion-independent sorted order.
    #[must_use]
    pub fn user_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.profiles.read().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Resolve (or lazily create) the entry for a user.
    fn entry(&self, user_id: &str) -> Arc<Mutex<UserProfile>> {
        if let Some(entry) = self.profiles.read().unwrap().get(user_id) {
            return Arc::clone(entry);
        }
        let mut profiles = self.profiles.write().unwrap();
        Arc::clone(profiles.entry(user_id.to_string()).or_insert_with(|| {
            debug!(user_id, "creating profile");
            Arc::new(Mutex::new(UserProfile::new(
                user_id,
                self.config.initial_balance,
            )))
        }))
    }

    /// Point-in-time copy of a user's profile plus derived rolling metrics.
    #[must_use]
    pub fn snapshot(&self, user_id: &str) -> ProfileSnapshot {
        let entry = self.entry(user_id);
        let profile = entry.lock().unwrap().clone();
        let rolling = RollingMetrics::derive(&profile);
        ProfileSnapshot { profile, rolling }
    }

    /// Rolling metrics for a user as of their current windows.
    #[must_use]
    pub fn rolling_metrics(&self, user_id: &str) -> RollingMetrics {
        let entry = self.entry(user_id);
        let profile = entry.lock().unwrap();
        RollingMetrics::derive(&profile)
    }

    /// Commit a scored transaction into a user's profile.
    ///
    /// Updates cumulative statistics, rolling windows, balance, session
    /// aggregates, and the repeated-high-risk counter, then returns a
    /// snapshot of the post-commit state. A transaction whose timestamp
    /// does not parse still updates cumulative statistics, balance, and
    /// the raw last-transaction-time string, but is kept out of the
    /// time-indexed windows.
    pub fn ingest(&self, transaction: &Transaction, risk_score: f64) -> ProfileSnapshot {
        let entry = self.entry(&transaction.user_id);
        let mut profile = entry.lock().unwrap();

        let amount = transaction.amount();

        // Cumulative statistics.
        profile.transaction_count += 1;
        profile.total_amount += amount;
        profile.average_spending = profile.total_amount / profile.transaction_count as f64;
        let location = transaction.location();
        if location != UNKNOWN {
            profile.location_history.insert(location.to_string());
        }
        *profile
            .merchant_frequency
            .entry(transaction.merchant().to_string())
            .or_insert(0) += 1;
        *profile
            .category_spend
            .entry(transaction.category().to_string())
            .or_insert(0.0) += amount;

        // Rolling windows, only for transactions with a parseable timestamp.
        let parsed_time = time::parse_opt(transaction.timestamp());
        match parsed_time {
            Some(t) => {
                profile.recent_window.push_back(WindowEntry {
                    time: t,
                    amount,
                    merchant: transaction.merchant().to_string(),
                    risk_score,
                });
                profile.weekly_window.push_back(WeeklyEntry { time: t, amount });
                rolling::prune_recent(&mut profile.recent_window, self.config.recent_window_secs);
                rolling::prune_weekly(&mut profile.weekly_window, self.config.weekly_window_secs);
            }
            None => {
                warn!(
                    transaction_id = %transaction.id,
                    timestamp = ?transaction.timestamp(),
                    "unparseable timestamp; transaction kept out of rolling windows"
                );
            }
        }

        profile.balance -= amount;

        // Session aggregates.
        let metrics = RollingMetrics::derive(&profile);
        profile.session_risk_score = rolling::session_risk_score(&profile.recent_window);
        profile.session_anomaly_score = rolling::session_anomaly_score(&metrics);

        // Repeated high risk arms a cooling-off period.
        if risk_score > self.config.suspicious_score_threshold {
            profile.suspicious_txn_count += 1;
            if profile.suspicious_txn_count >= self.config.suspicious_count_trigger {
                let anchor = parsed_time.unwrap_or_else(time::now);
                let until = anchor + Duration::minutes(self.config.cooling_off_minutes);
                profile.cooling_off_until = Some(until);
                profile.suspicious_txn_count = 0;
                warn!(
                    user_id = %profile.user_id,
                    cooling_off_until = %until,
                    "repeated high-risk activity; cooling-off armed"
                );
            }
        }

        if let Some(raw) = transaction.timestamp() {
            profile.last_transaction_time = Some(raw.to_string());
        }

        debug!(
            user_id = %profile.user_id,
            transaction_id = %transaction.id,
            risk_score,
            balance = profile.balance,
            "transaction committed"
        );

        let snapshot_profile = profile.clone();
        drop(profile);
        ProfileSnapshot {
            rolling: metrics,
            profile: snapshot_profile,
        }
    }

    /// Append a scored transaction to the user's audit history.
    pub fn record_risk_event(&self, transaction: &Transaction, analysis: &RiskAnalysis) {
        let entry = self.entry(&transaction.user_id);
        let mut profile = entry.lock().unwrap();

        let timestamp = transaction.timestamp().unwrap_or(UNKNOWN).to_string();
        profile.risk_history.push(RiskEvent {
            timestamp: timestamp.clone(),
            score: analysis.final_risk_score,
            amount: transaction.amount(),
            merchant: transaction.merchant().to_string(),
        });
        profile.session_risk_timeline.push(TimelineEntry {
            timestamp,
            score: analysis.final_risk_score,
            primary_tag: analysis.primary_tag.clone(),
            confidence: analysis.confidence_score,
            breakdown: analysis.risk_breakdown.clone(),
            counterfactual: analysis.counterfactual.clone(),
        });
    }

    /// Apply a confirmed verdict to a user's profile.
    ///
    /// Rejected without any state change while a cooling-off period is
    /// active; the feedback clock follows the transaction's own timestamp
    /// when it parses, and wall-clock time otherwise.
    pub fn apply_feedback(
        &self,
        transaction: &Transaction,
        verdict: Verdict,
    ) -> Result<FeedbackEffect> {
        let entry = self.entry(&transaction.user_id);
        let mut profile = entry.lock().unwrap();

        let now = time::parse_opt(transaction.timestamp()).unwrap_or_else(time::now);
        if let Some(until) = profile.cooling_off_until {
            if now < until {
                warn!(
                    user_id = %profile.user_id,
                    %until,
                    "feedback rejected during cooling-off"
                );
                return Err(FinGuardError::CoolingOffActive { until });
            }
        }

        let effect = feedback::apply(&mut profile, transaction, verdict, &self.config, now);
        profile.feedback_history.push(FeedbackRecord {
            transaction_id: transaction.id.clone(),
            timestamp: transaction.timestamp().unwrap_or(UNKNOWN).to_string(),
            verdict,
            effect: effect.description.clone(),
        });
        Ok(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(id: &str, amount: f64, timestamp: &str) -> Transaction {
        Transaction::new(id, "U1", amount)
            .with_merchant("Amazon")
            .with_category("Shopping")
            .with_location("NYC")
            .with_timestamp(timestamp)
    }

    #[test]
    fn test_lazy_profile_creation() {
        let store = ProfileStore::default();
        assert!(store.is_empty());

        let snap = store.snapshot("U1");
        assert_eq!(snap.profile.user_id, "U1");
        assert_eq!(snap.profile.balance, 10_000.0);
        assert_eq!(store.len(), 1);

        // Second reference reuses the entry.
        store.snapshot("U1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ingest_updates_cumulative_stats_and_balance() {
        let store = ProfileStore::default();
        store.ingest(&txn("T1", 100.0, "2026-02-22 10:00:00"), 10.0);
        let snap = store.ingest(&txn("T2", 50.0, "2026-02-22 10:05:00"), 10.0);

        let p = &snap.profile;
        assert_eq!(p.transaction_count, 2);
        assert_eq!(p.total_amount, 150.0);
        assert_eq!(p.average_spending, 75.0);
        assert_eq!(p.balance, 10_000.0 - 150.0);
        assert!(p.location_history.contains("NYC"));
        assert_eq!(p.merchant_frequency.get("Amazon"), Some(&2));
        assert_eq!(p.category_spend.get("Shopping"), Some(&150.0));
        assert_eq!(p.last_transaction_time.as_deref(), Some("2026-02-22 10:05:00"));
        assert_eq!(snap.rolling.txn_count_15m, 2);
    }

    #[test]
    fn test_unparseable_timestamp_skips_windows_but_not_stats() {
        let store = ProfileStore::default();
        let snap = store.ingest(&txn("T1", 100.0, "yesterday-ish"), 10.0);

        assert_eq!(snap.profile.transaction_count, 1);
        assert_eq!(snap.profile.balance, 9_900.0);
        assert!(snap.profile.recent_window.is_empty());
        assert!(snap.profile.weekly_window.is_empty());
        // The raw string is kept as received; consumers that need an
        // ordering parse it themselves and skip on failure.
        assert_eq!(
            snap.profile.last_transaction_time.as_deref(),
            Some("yesterday-ish")
        );
    }

    #[test]
    fn test_recent_window_prunes_relative_to_newest_entry() {
        let store = ProfileStore::default();
        store.ingest(&txn("T1", 10.0, "2026-02-22 08:00:00"), 0.0);
        store.ingest(&txn("T2", 10.0, "2026-02-22 09:30:00"), 0.0);
        let snap = store.ingest(&txn("T3", 10.0, "2026-02-22 10:00:00"), 0.0);

        // 08:00 is more than an hour before 10:00 and falls out.
        assert_eq!(snap.profile.recent_window.len(), 2);
        assert_eq!(snap.profile.weekly_window.len(), 3);
    }

    #[test]
    fn test_three_high_risk_transactions_arm_cooling_off() {
        let store = ProfileStore::default();
        store.ingest(&txn("T1", 10.0, "2026-02-22 10:00:00"), 75.0);
        store.ingest(&txn("T2", 10.0, "2026-02-22 10:01:00"), 80.0);
        let snap = store.ingest(&txn("T3", 10.0, "2026-02-22 10:02:00"), 90.0);

        let expected = time::parse_timestamp("2026-02-22 10:17:00").unwrap();
        assert_eq!(snap.profile.cooling_off_until, Some(expected));
        assert_eq!(snap.profile.suspicious_txn_count, 0);
    }

    #[test]
    fn test_score_at_threshold_is_not_suspicious() {
        let store = ProfileStore::default();
        for i in 0..5 {
            store.ingest(&txn(&format!("T{i}"), 10.0, "2026-02-22 10:00:00"), 70.0);
        }
        let snap = store.snapshot("U1");
        assert_eq!(snap.profile.suspicious_txn_count, 0);
        assert!(snap.profile.cooling_off_until.is_none());
    }

    #[test]
    fn test_feedback_rejected_during_cooling_off() {
        let store = ProfileStore::default();
        store.ingest(&txn("T1", 10.0, "2026-02-22 10:00:00"), 75.0);
        store.ingest(&txn("T2", 10.0, "2026-02-22 10:01:00"), 80.0);
        store.ingest(&txn("T3", 10.0, "2026-02-22 10:02:00"), 90.0);

        // Inside the window: rejected, no state change.
        let inside = txn("T4", 10.0, "2026-02-22 10:10:00");
        let err = store.apply_feedback(&inside, Verdict::Fraud).unwrap_err();
        assert!(matches!(err, FinGuardError::CoolingOffActive { .. }));

        let snap = store.snapshot("U1");
        assert_eq!(snap.profile.adaptive_weight_factor, 1.0);
        assert!(snap.profile.feedback_history.is_empty());

        // After expiry: accepted.
        let after = txn("T5", 10.0, "2026-02-22 10:30:00");
        let effect = store.apply_feedback(&after, Verdict::Legitimate).unwrap();
        assert!((effect.new_weight - 0.95).abs() < 1e-9);
        assert_eq!(store.snapshot("U1").profile.feedback_history.len(), 1);
    }

    #[test]
    fn test_snapshot_is_isolated_from_store() {
        let store = ProfileStore::default();
        store.ingest(&txn("T1", 100.0, "2026-02-22 10:00:00"), 10.0);

        let mut snap = store.snapshot("U1");
        snap.profile.balance = 0.0;
        snap.profile.recent_window.clear();

        let fresh = store.snapshot("U1");
        assert_eq!(fresh.profile.balance, 9_900.0);
        assert_eq!(fresh.profile.recent_window.len(), 1);
    }

    #[test]
    fn test_record_risk_event_appends_history_and_timeline() {
        let store = ProfileStore::default();
        let transaction = txn("T1", 100.0, "2026-02-22 10:00:00");
        let analysis = RiskAnalysis {
            transaction_id: "T1".to_string(),
            final_risk_score: 72.5,
            confidence_score: 80.0,
            risk_level: finguard_core::types::RiskLevel::High,
            primary_tag: "Velocity Anomaly".to_string(),
            risk_breakdown: Default::default(),
            counterfactual: "n/a".to_string(),
            reasons: vec![],
            risk_trend: finguard_core::types::RiskTrend::Stable,
            last_5_avg_risk: 72.5,
        };

        store.record_risk_event(&transaction, &analysis);
        store.record_risk_event(&transaction, &analysis);

        let snap = store.snapshot("U1");
        assert_eq!(snap.profile.risk_history.len(), 2);
        assert_eq!(snap.profile.session_risk_timeline.len(), 2);
        assert_eq!(snap.profile.risk_history[0].score, 72.5);
        assert_eq!(snap.profile.session_risk_timeline[1].primary_tag, "Velocity Anomaly");
    }

    #[test]
    fn test_user_ids_sorted() {
        let store = ProfileStore::default();
        store.snapshot("U3");
        store.snapshot("U1");
        store.snapshot("U2");
        assert_eq!(store.user_ids(), vec!["U1", "U2", "U3"]);
    }
}
