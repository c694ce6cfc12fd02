//! Layered risk scoring engine.
//!
//! Four layers score a transaction against a profile snapshot; their
//! outputs are fused with fixed weights, scaled by the user's adaptive
//! sensitivity, and bounded to [0, 100]. The engine is stateless and
//! read-only: it never mutates the snapshot or the store, which is what
//! makes the simulation path safe.

use finguard_core::time;
use finguard_core::types::{RiskAnalysis, RiskLevel, RiskSignal, RiskTrend, Transaction, UNKNOWN};
use finguard_profile::ProfileSnapshot;
use std::collections::BTreeMap;
use tracing::debug;

// Fusion weights. Must sum to 1.
const W_RULE: f64 = 0.35;
const W_STATISTICAL: f64 = 0.25;
const W_LEARNED: f64 = 0.20;
const W_BEHAVIORAL: f64 = 0.20;

/// Band around the last-5 average treated as a stable trend.
const TREND_BAND: f64 = 5.0;
/// Breakdown contributions above this corroborate the verdict.
const CORROBORATION_FLOOR: f64 = 20.0;
/// Breakdown contributions above this can claim the primary tag.
const TAG_FLOOR: f64 = 40.0;

/// Output of a single scoring layer.
#[derive(Debug, Default)]
struct LayerOutcome {
    score: f64,
    reasons: Vec<String>,
    signals: Vec<(RiskSignal, f64)>,
}

impl LayerOutcome {
    fn add(&mut self, points: f64, signal: Option<RiskSignal>, reason: String) {
        self.score += points;
        if let Some(signal) = signal {
            self.signals.push((signal, points));
        }
        self.reasons.push(reason);
    }
}

/// Stateless four-layer scoring engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    /// Create an engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Score a transaction against a profile snapshot.
    #[must_use]
    pub fn analyze(&self, transaction: &Transaction, snapshot: &ProfileSnapshot) -> RiskAnalysis {
        let rule = self.rule_layer(transaction, snapshot);
        let statistical = self.statistical_layer(transaction, snapshot);
        let learned = self.learned_layer(&rule, &statistical);
        let behavioral = self.behavioral_layer(transaction, snapshot);

        let base = W_RULE * rule.score
            + W_STATISTICAL * statistical.score
            + W_LEARNED * learned.score
            + W_BEHAVIORAL * behavioral.score;
        let final_score =
            round2(base * snapshot.profile.adaptive_weight_factor).min(100.0);

        let layers = [&rule, &statistical, &learned, &behavioral];
        let breakdown = self.breakdown(&layers, snapshot);
        let reasons = dedup_reasons(&layers);
        let confidence = self.confidence(&breakdown, final_score);
        let primary_tag = self.primary_tag(&breakdown);
        let counterfactual = self.counterfactual(transaction, snapshot);
        let (risk_trend, last_5_avg_risk) = self.trend(final_score, snapshot);

        debug!(
            transaction_id = %transaction.id,
            rule = rule.score,
            statistical = statistical.score,
            learned = learned.score,
            behavioral = behavioral.score,
            final_score,
            "transaction scored"
        );

        RiskAnalysis {
            transaction_id: transaction.id.clone(),
            final_risk_score: final_score,
            confidence_score: confidence,
            risk_level: RiskLevel::from(final_score),
            primary_tag,
            risk_breakdown: breakdown,
            counterfactual,
            reasons,
            risk_trend,
            last_5_avg_risk,
        }
    }

    /// Layer 1: fixed-rule checks against the user's history.
    fn rule_layer(&self, transaction: &Transaction, snapshot: &ProfileSnapshot) -> LayerOutcome {
        let profile = &snapshot.profile;
        let amount = transaction.amount();
        let mut outcome = LayerOutcome::default();

        if profile.transaction_count > 2 && amount > 3.0 * profile.average_spending {
            outcome.add(
                50.0,
                Some(RiskSignal::AmountDeviation),
                format!(
                    "Amount deviation: {amount:.2} exceeds 3x average spending {:.2}",
                    profile.average_spending
                ),
            );
        }

        let location = transaction.location();
        if location != UNKNOWN
            && !profile.location_history.contains(location)
            && !profile.trusted_locations.contains(location)
        {
            outcome.add(
                30.0,
                Some(RiskSignal::NewBeneficiary),
                format!("Transaction from previously unseen location '{location}'"),
            );
        }

        let merchant = transaction.merchant();
        if profile.trusted_merchants.contains(merchant) {
            outcome.score -= 20.0;
            outcome
                .reasons
                .push(format!("Merchant '{merchant}' is trusted; risk discounted"));
        }

        // Back-to-back transactions within a minute. Skipped entirely when
        // either timestamp fails to parse or the stream runs backwards.
        if let (Some(current), Some(previous)) = (
            time::parse_opt(transaction.timestamp()),
            time::parse_opt(profile.last_transaction_time.as_deref()),
        ) {
            let gap = (current - previous).num_seconds();
            if (0..60).contains(&gap) {
                outcome.add(
                    40.0,
                    Some(RiskSignal::VelocitySpike),
                    format!("Transaction follows the previous one by only {gap}s"),
                );
            }
        }

        outcome.score = outcome.score.clamp(0.0, 100.0);
        outcome
    }

    /// Layer 2: statistical deviation from the lifetime spending baseline.
    fn statistical_layer(
        &self,
        transaction: &Transaction,
        snapshot: &ProfileSnapshot,
    ) -> LayerOutcome {
        let profile = &snapshot.profile;
        let mut outcome = LayerOutcome::default();

        if profile.transaction_count < 2 || profile.average_spending <= 0.0 {
            return outcome;
        }

        let deviation_pct =
            (transaction.amount() - profile.average_spending).abs() / profile.average_spending
                * 100.0;
        if deviation_pct > 200.0 {
            let score = (deviation_pct / 5.0).min(100.0);
            outcome.add(
                score,
                Some(RiskSignal::AmountDeviation),
                format!("Statistical deviation of {deviation_pct:.1}% from spending baseline"),
            );
        }

        outcome
    }

    /// Layer 3: simulated learned model, a logistic curve over the mean of
    /// the first two layers. Contributes a score only; reasons describe
    /// triggered rules, and no rule triggers here.
    fn learned_layer(&self, rule: &LayerOutcome, statistical: &LayerOutcome) -> LayerOutcome {
        let mean = (rule.score + statistical.score) / 2.0;
        LayerOutcome {
            score: 100.0 / (1.0 + (-0.1 * (mean - 50.0)).exp()),
            ..LayerOutcome::default()
        }
    }

    /// Layer 4: behavioral checks over the rolling-window metrics.
    fn behavioral_layer(
        &self,
        transaction: &Transaction,
        snapshot: &ProfileSnapshot,
    ) -> LayerOutcome {
        let rolling = &snapshot.rolling;
        let amount = transaction.amount();
        let mut outcome = LayerOutcome::default();

        if rolling.avg_7d_amount > 0.0 && amount > 2.5 * rolling.avg_7d_amount {
            outcome.add(
                40.0,
                Some(RiskSignal::AmountDeviation),
                format!(
                    "Amount deviation from 7-day baseline ({amount:.2} vs avg {:.2})",
                    rolling.avg_7d_amount
                ),
            );
        }

        if rolling.txn_count_5m >= 3 {
            outcome.add(
                50.0,
                Some(RiskSignal::VelocitySpike),
                format!("{} transactions within 5 minutes", rolling.txn_count_5m),
            );
        } else if rolling.txn_count_15m >= 5 {
            outcome.add(
                30.0,
                Some(RiskSignal::VelocitySpike),
                format!("{} transactions within 15 minutes", rolling.txn_count_15m),
            );
        }

        let balance = rolling.account_balance;
        let outflow = rolling.total_spend_30m;
        if balance > 0.0 && outflow > 0.4 * (balance + outflow) {
            outcome.add(
                60.0,
                Some(RiskSignal::BalanceDrain),
                format!("Rapid balance drain: {outflow:.2} spent in 30 minutes against balance {balance:.2}"),
            );
        }

        outcome.score = outcome.score.min(100.0);
        outcome
    }

    /// Merge per-layer signal tags into the presentation breakdown,
    /// keeping the strongest contribution per signal.
    fn breakdown(
        &self,
        layers: &[&LayerOutcome],
        snapshot: &ProfileSnapshot,
    ) -> BTreeMap<RiskSignal, f64> {
        let mut breakdown: BTreeMap<RiskSignal, f64> = BTreeMap::new();
        for layer in layers {
            for (signal, points) in &layer.signals {
                let slot = breakdown.entry(*signal).or_insert(0.0);
                if *points > *slot {
                    *slot = *points;
                }
            }
        }

        // Derived presentation signals: sustained 30-minute outflow as a
        // share of available funds, and the session anomaly score.
        let rolling = &snapshot.rolling;
        let denominator = rolling.account_balance + rolling.total_spend_30m;
        if denominator > 0.0 && rolling.total_spend_30m > 0.0 {
            let ratio = round2(rolling.total_spend_30m / denominator * 100.0);
            breakdown.insert(RiskSignal::CumulativeOutflow, ratio);
        }
        if snapshot.profile.session_anomaly_score > 0.0 {
            breakdown.insert(
                RiskSignal::SessionAnomaly,
                snapshot.profile.session_anomaly_score,
            );
        }

        breakdown.retain(|_, v| *v > 0.0);
        breakdown
    }

    fn confidence(&self, breakdown: &BTreeMap<RiskSignal, f64>, final_score: f64) -> f64 {
        let corroborating = breakdown
            .values()
            .filter(|v| **v > CORROBORATION_FLOOR)
            .count() as f64;
        let mut confidence = 60.0 + 10.0 * corroborating;
        if final_score > 80.0 {
            confidence += 10.0;
        }
        confidence.min(100.0)
    }

    fn primary_tag(&self, breakdown: &BTreeMap<RiskSignal, f64>) -> String {
        let above = |signal: RiskSignal| breakdown.get(&signal).is_some_and(|v| *v > TAG_FLOOR);

        let tag = if above(RiskSignal::VelocitySpike) {
            "Velocity Anomaly"
        } else if above(RiskSignal::BalanceDrain) {
            "Account Drain Pattern"
        } else if above(RiskSignal::CumulativeOutflow) {
            "Layered Transfer Pattern"
        } else if above(RiskSignal::AmountDeviation) {
            "Heavy Deviation"
        } else {
            "Behavioral Drift"
        };
        tag.to_string()
    }

    fn counterfactual(&self, transaction: &Transaction, snapshot: &ProfileSnapshot) -> String {
        let avg = snapshot.profile.average_spending;
        if transaction.amount() > 1.5 * avg {
            format!(
                "Reducing the amount below {:.2} would cut the risk score by roughly 35%",
                1.5 * avg
            )
        } else {
            "Risk is driven by non-monetary factors; lowering the amount alone would not materially reduce it".to_string()
        }
    }

    fn trend(&self, final_score: f64, snapshot: &ProfileSnapshot) -> (RiskTrend, f64) {
        let scores = snapshot.profile.last_scores(5);
        if scores.is_empty() {
            return (RiskTrend::Stable, final_score);
        }
        let avg = scores.iter().sum::<f64>() / scores.len() as f64;
        let trend = if final_score > avg + TREND_BAND {
            RiskTrend::Increasing
        } else if final_score < avg - TREND_BAND {
            RiskTrend::Decreasing
        } else {
            RiskTrend::Stable
        };
        (trend, round2(avg))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn dedup_reasons(layers: &[&LayerOutcome]) -> Vec<String> {
    let mut seen = Vec::new();
    for layer in layers {
        for reason in &layer.reasons {
            if !seen.contains(reason) {
                seen.push(reason.clone());
            }
        }
    }
    seen
}
