//! Rolling-window metric derivation.
//!
//! All sub-window metrics are anchored at the newest entry of the window
//! they derive from, not at wall-clock time. This keeps replayed or
//! backdated transaction streams deterministic.

use crate::profile::{UserProfile, WeeklyEntry, WindowEntry};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Scores contributing to the session risk score.
const SESSION_SCORE_DEPTH: usize = 10;

/// Derived view over a profile's rolling windows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingMetrics {
    /// Transactions in the last 5 minutes.
    pub txn_count_5m: usize,
    /// Transactions in the last 15 minutes.
    pub txn_count_15m: usize,
    /// Transactions in the last 30 minutes.
    pub txn_count_30m: usize,
    /// Transactions in the last hour.
    pub txn_count_1h: usize,
    /// Spend in the last 5 minutes.
    pub total_spend_5m: f64,
    /// Spend in the last 15 minutes.
    pub total_spend_15m: f64,
    /// Spend in the last 30 minutes.
    pub total_spend_30m: f64,
    /// Spend in the last hour.
    pub total_spend_1h: f64,
    /// Mean risk score over the last hour, 0.0 when the window is empty.
    pub avg_risk_1h: f64,
    /// Mean transaction amount over the 7-day window, 0.0 when empty.
    pub avg_7d_amount: f64,
    /// Account balance at derivation time.
    pub account_balance: f64,
}

impl RollingMetrics {
    /// Derive metrics from a profile's current windows.
    #[must_use]
    pub fn derive(profile: &UserProfile) -> Self {
        let mut metrics = Self {
            account_balance: profile.balance,
            avg_7d_amount: weekly_average(&profile.weekly_window),
            ..Self::default()
        };

        let Some(anchor) = profile.recent_window.back().map(|e| e.time) else {
            return metrics;
        };

        let mut risk_sum = 0.0;
        for entry in &profile.recent_window {
            let age = anchor - entry.time;
            if age <= Duration::minutes(5) {
                metrics.txn_count_5m += 1;
                metrics.total_spend_5m += entry.amount;
            }
            if age <= Duration::minutes(15) {
                metrics.txn_count_15m += 1;
                metrics.total_spend_15m += entry.amount;
            }
            if age <= Duration::minutes(30) {
                metrics.txn_count_30m += 1;
                metrics.total_spend_30m += entry.amount;
            }
            if age <= Duration::hours(1) {
                metrics.txn_count_1h += 1;
                metrics.total_spend_1h += entry.amount;
                risk_sum += entry.risk_score;
            }
        }

        if metrics.txn_count_1h > 0 {
            metrics.avg_risk_1h = risk_sum / metrics.txn_count_1h as f64;
        }

        metrics
    }
}

/// Drop recent-window entries older than `span_secs` relative to the
/// window's own latest entry.
pub fn prune_recent(window: &mut VecDeque<WindowEntry>, span_secs: i64) {
    let Some(anchor) = window.back().map(|e| e.time) else {
        return;
    };
    let cutoff = anchor - Duration::seconds(span_secs);
    while window.front().is_some_and(|e| e.time < cutoff) {
        window.pop_front();
    }
}

/// Drop weekly-window entries older than `span_secs` relative to the
/// window's own latest entry.
pub fn prune_weekly(window: &mut VecDeque<WeeklyEntry>, span_secs: i64) {
    let Some(anchor) = window.back().map(|e| e.time) else {
        return;
    };
    let cutoff = anchor - Duration::seconds(span_secs);
    while window.front().is_some_and(|e| e.time < cutoff) {
        window.pop_front();
    }
}

/// Mean of the newest (up to ten) recent-window risk scores.
#[must_use]
pub fn session_risk_score(window: &VecDeque<WindowEntry>) -> f64 {
    let scores: Vec<f64> = window
        .iter()
        .rev()
        .take(SESSION_SCORE_DEPTH)
        .map(|e| e.risk_score)
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Session anomaly score in [0, 100], blending 30-minute burst count,
/// 30-minute spend, and hourly average risk.
#[must_use]
pub fn session_anomaly_score(metrics: &RollingMetrics) -> f64 {
    let burst = (metrics.txn_count_30m as f64 / 10.0).min(1.0) * 40.0;
    let spend = (metrics.total_spend_30m / 5_000.0).min(1.0) * 30.0;
    let risk = (metrics.avg_risk_1h / 100.0).min(1.0) * 30.0;
    let score = (burst + spend + risk) * 100.0;
    (score.round() / 100.0).min(100.0)
}

fn weekly_average(window: &VecDeque<WeeklyEntry>) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().map(|e| e.amount).sum::<f64>() / window.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").expect("valid timestamp")
    }

    fn entry(time: &str, amount: f64, risk: f64) -> WindowEntry {
        WindowEntry {
            time: ts(time),
            amount,
            merchant: "Shop".to_string(),
            risk_score: risk,
        }
    }

    #[test]
    fn test_empty_windows_derive_zeroes() {
        let profile = UserProfile::new("U1", 250.0);
        let metrics = RollingMetrics::derive(&profile);
        assert_eq!(metrics.txn_count_1h, 0);
        assert_eq!(metrics.avg_risk_1h, 0.0);
        assert_eq!(metrics.avg_7d_amount, 0.0);
        assert_eq!(metrics.account_balance, 250.0);
    }

    #[test]
    fn test_sub_windows_are_anchored_at_newest_entry() {
        let mut profile = UserProfile::new("U1", 0.0);
        profile.recent_window.push_back(entry("2026-02-22 09:05:00", 100.0, 80.0));
        profile.recent_window.push_back(entry("2026-02-22 09:48:00", 50.0, 20.0));
        profile.recent_window.push_back(entry("2026-02-22 10:00:00", 25.0, 40.0));

        let metrics = RollingMetrics::derive(&profile);
        // 09:05 is 55 minutes before the anchor (10:00), still inside 1h.
        assert_eq!(metrics.txn_count_5m, 1);
        assert_eq!(metrics.txn_count_15m, 2);
        assert_eq!(metrics.txn_count_30m, 2);
        assert_eq!(metrics.txn_count_1h, 3);
        assert_eq!(metrics.total_spend_30m, 75.0);
        assert_eq!(metrics.total_spend_1h, 175.0);
        assert!((metrics.avg_risk_1h - 140.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_prune_recent_drops_entries_past_span() {
        let mut window = VecDeque::new();
        window.push_back(entry("2026-02-22 08:00:00", 10.0, 0.0));
        window.push_back(entry("2026-02-22 09:30:00", 10.0, 0.0));
        window.push_back(entry("2026-02-22 10:00:00", 10.0, 0.0));

        prune_recent(&mut window, 3600);
        assert_eq!(window.len(), 2);
        assert_eq!(window.front().map(|e| e.time), Some(ts("2026-02-22 09:30:00")));
    }

    #[test]
    fn test_prune_matches_brute_force_filter() {
        let times = [
            "2026-02-22 07:00:00",
            "2026-02-22 09:00:30",
            "2026-02-22 09:15:00",
            "2026-02-22 09:59:59",
            "2026-02-22 10:00:00",
        ];
        let mut window: VecDeque<WindowEntry> =
            times.iter().map(|t| entry(t, 1.0, 0.0)).collect();

        let anchor = ts("2026-02-22 10:00:00");
        let expected: Vec<NaiveDateTime> = times
            .iter()
            .map(|t| ts(t))
            .filter(|t| (anchor - *t) <= Duration::seconds(3600))
            .collect();

        prune_recent(&mut window, 3600);
        let actual: Vec<NaiveDateTime> = window.iter().map(|e| e.time).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_session_risk_score_uses_newest_ten() {
        let mut window = VecDeque::new();
        for i in 0..12 {
            window.push_back(entry("2026-02-22 10:00:00", 1.0, i as f64 * 10.0));
        }
        // Entries 2..12 survive the cut; mean of 20..=110 step 10 is 65.
        assert_eq!(session_risk_score(&window), 65.0);
        assert_eq!(session_risk_score(&VecDeque::new()), 0.0);
    }

    #[test]
    fn test_anomaly_score_saturates_at_100() {
        let metrics = RollingMetrics {
            txn_count_30m: 50,
            total_spend_30m: 100_000.0,
            avg_risk_1h: 100.0,
            ..RollingMetrics::default()
        };
        assert_eq!(session_anomaly_score(&metrics), 100.0);
    }

    #[test]
    fn test_anomaly_score_blends_components() {
        let metrics = RollingMetrics {
            txn_count_30m: 5,
            total_spend_30m: 2_500.0,
            avg_risk_1h: 50.0,
            ..RollingMetrics::default()
        };
        // 0.5*40 + 0.5*30 + 0.5*30 = 50.
        assert_eq!(session_anomaly_score(&metrics), 50.0);
    }
}
