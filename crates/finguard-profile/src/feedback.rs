//! Adaptive feedback controller.
//!
//! Confirmed verdicts tune the per-user sensitivity multiplier inside hard
//! safety bounds: legitimate outcomes relax it multiplicatively, fraud
//! outcomes tighten it additively and arm a cooling-off period. The
//! cooling-off gate itself lives in [`crate::store::ProfileStore`]; this
//! module only applies effects.

use crate::profile::{UserProfile, MAX_ADAPTIVE_WEIGHT, MIN_ADAPTIVE_WEIGHT};
use chrono::{Duration, NaiveDateTime};
use finguard_core::config::StoreConfig;
use finguard_core::types::{Transaction, Verdict, UNKNOWN};
use tracing::info;

/// Relaxation multiplier applied per legitimate verdict.
const LEGITIMATE_RELAX: f64 = 0.95;
/// Tightening increment applied per fraud verdict.
const FRAUD_TIGHTEN: f64 = 0.1;

/// Outcome of applying one verdict to a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackEffect {
    /// Sensitivity multiplier after the adjustment.
    pub new_weight: f64,
    /// End of the cooling-off period armed by this verdict, if any.
    pub cooling_off_until: Option<NaiveDateTime>,
    /// Human-readable description of what changed.
    pub description: String,
}

/// Apply a confirmed verdict to `profile`, assuming the cooling-off gate
/// has already been cleared by the caller.
pub fn apply(
    profile: &mut UserProfile,
    transaction: &Transaction,
    verdict: Verdict,
    config: &StoreConfig,
    now: NaiveDateTime,
) -> FeedbackEffect {
    match verdict {
        Verdict::Legitimate => {
            profile.adaptive_weight_factor =
                (profile.adaptive_weight_factor * LEGITIMATE_RELAX).max(MIN_ADAPTIVE_WEIGHT);

            let mut trusted = Vec::new();
            let location = transaction.location();
            if location != UNKNOWN && profile.trusted_locations.insert(location.to_string()) {
                trusted.push(format!("location '{location}'"));
            }
            let merchant = transaction.merchant();
            if merchant != UNKNOWN && profile.trusted_merchants.insert(merchant.to_string()) {
                trusted.push(format!("merchant '{merchant}'"));
            }

            let description = if trusted.is_empty() {
                format!("Sensitivity relaxed to {:.3}", profile.adaptive_weight_factor)
            } else {
                format!(
                    "Sensitivity relaxed to {:.3}; trusted {}",
                    profile.adaptive_weight_factor,
                    trusted.join(" and ")
                )
            };

            info!(
                user_id = %profile.user_id,
                new_weight = profile.adaptive_weight_factor,
                "legitimate verdict applied"
            );

            FeedbackEffect {
                new_weight: profile.adaptive_weight_factor,
                cooling_off_until: None,
                description,
            }
        }
        Verdict::Fraud => {
            profile.adaptive_weight_factor =
                (profile.adaptive_weight_factor + FRAUD_TIGHTEN).min(MAX_ADAPTIVE_WEIGHT);

            let until = now + Duration::minutes(config.cooling_off_minutes);
            profile.cooling_off_until = Some(until);

            info!(
                user_id = %profile.user_id,
                new_weight = profile.adaptive_weight_factor,
                cooling_off_until = %until,
                "fraud verdict applied"
            );

            FeedbackEffect {
                new_weight: profile.adaptive_weight_factor,
                cooling_off_until: Some(until),
                description: format!(
                    "Sensitivity tightened to {:.3}; cooling-off until {until}",
                    profile.adaptive_weight_factor
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finguard_core::time::parse_timestamp;

    fn now() -> NaiveDateTime {
        parse_timestamp("2026-02-22 12:00:00").expect("valid timestamp")
    }

    #[test]
    fn test_legitimate_never_drops_below_floor() {
        let mut profile = UserProfile::new("U1", 0.0);
        let config = StoreConfig::default();
        let txn = Transaction::new("T1", "U1", 50.0);

        for _ in 0..20 {
            apply(&mut profile, &txn, Verdict::Legitimate, &config, now());
        }
        assert!(profile.adaptive_weight_factor >= MIN_ADAPTIVE_WEIGHT);
        assert_eq!(profile.adaptive_weight_factor, MIN_ADAPTIVE_WEIGHT);
    }

    #[test]
    fn test_fraud_never_exceeds_cap() {
        let mut profile = UserProfile::new("U1", 0.0);
        let config = StoreConfig::default();
        let txn = Transaction::new("T1", "U1", 50.0);

        for _ in 0..40 {
            apply(&mut profile, &txn, Verdict::Fraud, &config, now());
        }
        assert_eq!(profile.adaptive_weight_factor, MAX_ADAPTIVE_WEIGHT);
    }

    #[test]
    fn test_legitimate_trusts_location_and_merchant() {
        let mut profile = UserProfile::new("U1", 0.0);
        let config = StoreConfig::default();
        let txn = Transaction::new("T1", "U1", 50.0)
            .with_merchant("Amazon")
            .with_location("NYC");

        let effect = apply(&mut profile, &txn, Verdict::Legitimate, &config, now());
        assert!(profile.trusted_locations.contains("NYC"));
        assert!(profile.trusted_merchants.contains("Amazon"));
        assert!(effect.description.contains("NYC"));
        assert!(effect.cooling_off_until.is_none());
    }

    #[test]
    fn test_unknown_placeholders_are_never_trusted() {
        let mut profile = UserProfile::new("U1", 0.0);
        let config = StoreConfig::default();
        let txn = Transaction::new("T1", "U1", 50.0);

        apply(&mut profile, &txn, Verdict::Legitimate, &config, now());
        assert!(profile.trusted_locations.is_empty());
        assert!(profile.trusted_merchants.is_empty());
    }

    #[test]
    fn test_fraud_arms_cooling_off() {
        let mut profile = UserProfile::new("U1", 0.0);
        let config = StoreConfig::default();
        let txn = Transaction::new("T1", "U1", 50.0);

        let effect = apply(&mut profile, &txn, Verdict::Fraud, &config, now());
        let until = now() + Duration::minutes(config.cooling_off_minutes);
        assert_eq!(profile.cooling_off_until, Some(until));
        assert_eq!(effect.cooling_off_until, Some(until));
        assert!((profile.adaptive_weight_factor - 1.1).abs() < 1e-9);
    }
}
