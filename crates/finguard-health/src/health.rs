//! Financial health scoring.
//!
//! Health starts at 100 and loses a weighted blend of penalties derived
//! from the user's recent risk history and the latest analysis. The blend
//! weights sum to 1, so the raw penalty is itself bounded; the final score
//! is clamped to [0, 100] regardless.

use finguard_core::types::{RiskAnalysis, RiskTrend};
use finguard_profile::UserProfile;
use serde::{Deserialize, Serialize};
use tracing::debug;

// Penalty blend weights.
const W_RECENT_RISK: f64 = 0.4;
const W_HIGH_RISK_COUNT: f64 = 0.3;
const W_TREND: f64 = 0.2;
const W_DEVIATION: f64 = 0.1;

/// History scores above this count as high-risk incidents.
const HIGH_RISK_SCORE: f64 = 60.0;
/// Penalty points per high-risk incident, before the cap.
const HIGH_RISK_STEP: f64 = 20.0;

/// Health classification bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    /// Health score <= 40.
    Risky,
    /// 40 < health score <= 70.
    Moderate,
    /// Health score > 70.
    Healthy,
}

impl From<f64> for HealthStatus {
    fn from(score: f64) -> Self {
        match score {
            s if s <= 40.0 => HealthStatus::Risky,
            s if s <= 70.0 => HealthStatus::Moderate,
            _ => HealthStatus::Healthy,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Risky => write!(f, "RISKY"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Healthy => write!(f, "HEALTHY"),
        }
    }
}

/// Assessed financial health of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// Health score in [0, 100]; higher is healthier.
    pub health_score: f64,
    /// Classification of the score.
    pub status: HealthStatus,
    /// What dragged the score down, or a single all-clear line.
    pub factors: Vec<String>,
}

/// Stateless health scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthScorer;

impl HealthScorer {
    /// Create a scorer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Assess a user's health from their history and the latest analysis.
    #[must_use]
    pub fn assess(&self, profile: &UserProfile, latest: &RiskAnalysis) -> HealthScore {
        let mut factors = Vec::new();

        let recent = profile.last_scores(5);
        let recent_avg = if recent.is_empty() {
            latest.final_risk_score
        } else {
            recent.iter().sum::<f64>() / recent.len() as f64
        };
        if recent_avg > 50.0 {
            factors.push(format!("Recent risk average elevated at {recent_avg:.1}"));
        }

        let high_risk_count = profile
            .risk_history
            .iter()
            .filter(|e| e.score > HIGH_RISK_SCORE)
            .count();
        let incident_penalty = (high_risk_count as f64 * HIGH_RISK_STEP).min(100.0);
        if high_risk_count > 0 {
            factors.push(format!("{high_risk_count} high-risk transactions on record"));
        }

        let trend_penalty = match latest.risk_trend {
            RiskTrend::Increasing => {
                factors.push("Risk trend is increasing".to_string());
                50.0
            }
            RiskTrend::Decreasing => -20.0,
            RiskTrend::Stable => 0.0,
        };

        let deviation_penalty = if latest
            .reasons
            .iter()
            .any(|r| r.to_lowercase().contains("deviation"))
        {
            factors.push("Spending deviates from the established pattern".to_string());
            50.0
        } else {
            0.0
        };

        let penalty = W_RECENT_RISK * recent_avg
            + W_HIGH_RISK_COUNT * incident_penalty
            + W_TREND * trend_penalty
            + W_DEVIATION * deviation_penalty;
        let health_score = ((100.0 - penalty).clamp(0.0, 100.0) * 100.0).round() / 100.0;

        if factors.is_empty() {
            factors.push("Consistent healthy financial behavior".to_string());
        }

        debug!(
            user_id = %profile.user_id,
            health_score,
            high_risk_count,
            "health assessed"
        );

        HealthScore {
            health_score,
            status: HealthStatus::from(health_score),
            factors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finguard_core::types::{RiskLevel, RiskTrend};
    use finguard_profile::RiskEvent;

    fn analysis(score: f64, trend: RiskTrend, reasons: Vec<String>) -> RiskAnalysis {
        RiskAnalysis {
            transaction_id: "T1".to_string(),
            final_risk_score: score,
            confidence_score: 60.0,
            risk_level: RiskLevel::from(score),
            primary_tag: "Behavioral Drift".to_string(),
            risk_breakdown: Default::default(),
            counterfactual: String::new(),
            reasons,
            risk_trend: trend,
            last_5_avg_risk: score,
        }
    }

    fn with_history(scores: &[f64]) -> UserProfile {
        let mut profile = UserProfile::new("U1", 10_000.0);
        for score in scores {
            profile.risk_history.push(RiskEvent {
                timestamp: "2026-02-22 10:00:00".to_string(),
                score: *score,
                amount: 10.0,
                merchant: "Shop".to_string(),
            });
        }
        profile
    }

    #[test]
    fn test_clean_profile_is_healthy() {
        let scorer = HealthScorer::new();
        let profile = with_history(&[5.0, 10.0, 8.0]);
        let score = scorer.assess(&profile, &analysis(8.0, RiskTrend::Stable, vec![]));

        assert_eq!(score.status, HealthStatus::Healthy);
        assert!(score.health_score > 90.0);
        assert_eq!(score.factors, vec!["Consistent healthy financial behavior"]);
    }

    #[test]
    fn test_known_penalty_blend() {
        let scorer = HealthScorer::new();
        let profile = with_history(&[70.0, 70.0, 70.0, 70.0, 70.0]);
        let latest = analysis(
            75.0,
            RiskTrend::Increasing,
            vec!["Amount deviation: 900.00 exceeds 3x average spending 100.00".to_string()],
        );

        // Five of five scores exceed 60, so the incident penalty caps at 100:
        // 0.4*70 + 0.3*100 + 0.2*50 + 0.1*50 = 73.
        let score = scorer.assess(&profile, &latest);
        assert_eq!(score.health_score, 27.0);
        assert_eq!(score.status, HealthStatus::Risky);
        assert_eq!(score.factors.len(), 4);
    }

    #[test]
    fn test_decreasing_trend_credits_health() {
        let scorer = HealthScorer::new();
        let profile = with_history(&[30.0, 30.0, 30.0]);

        let stable = scorer.assess(&profile, &analysis(30.0, RiskTrend::Stable, vec![]));
        let improving = scorer.assess(&profile, &analysis(20.0, RiskTrend::Decreasing, vec![]));
        assert!(improving.health_score > stable.health_score);
    }

    #[test]
    fn test_score_clamped_at_maximal_penalties() {
        let scorer = HealthScorer::new();
        let profile = with_history(&[100.0; 20]);
        let latest = analysis(
            100.0,
            RiskTrend::Increasing,
            vec!["Statistical deviation of 900.0% from spending baseline".to_string()],
        );

        let score = scorer.assess(&profile, &latest);
        assert!(score.health_score >= 0.0);
        assert_eq!(score.status, HealthStatus::Risky);
    }

    #[test]
    fn test_empty_history_falls_back_to_latest_score() {
        let scorer = HealthScorer::new();
        let profile = UserProfile::new("U1", 10_000.0);
        let score = scorer.assess(&profile, &analysis(0.0, RiskTrend::Stable, vec![]));
        assert_eq!(score.health_score, 100.0);
        assert_eq!(score.status, HealthStatus::Healthy);
    }

    #[test]
    fn test_status_boundaries() {
        assert_eq!(HealthStatus::from(40.0), HealthStatus::Risky);
        assert_eq!(HealthStatus::from(40.01), HealthStatus::Moderate);
        assert_eq!(HealthStatus::from(70.0), HealthStatus::Moderate);
        assert_eq!(HealthStatus::from(70.01), HealthStatus::Healthy);
    }
}
