//! End-to-end risk pipeline.
//!
//! One `process` call runs the full flow: snapshot the profile, score the
//! transaction, gate the decision, commit the transaction into the profile,
//! record the audit trail, assess health, and archive high-risk analyses.
//! `simulate` runs only the read-only scoring half and leaves every profile
//! untouched.

use finguard_core::config::FinGuardConfig;
use finguard_core::error::Result;
use finguard_core::types::{RiskAnalysis, Transaction, Verdict};
use finguard_health::{AlertArchive, HealthScore, HealthScorer};
use finguard_profile::{FeedbackEffect, ProfileSnapshot, ProfileStore, RollingMetrics};
use finguard_scoring::{DecisionGate, GateOutcome, ScoringEngine, SessionContext};
use serde::Serialize;
use tracing::info;

/// Everything the pipeline produced for one transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionOutcome {
    /// The scored analysis.
    pub analysis: RiskAnalysis,
    /// The gated decision.
    pub gate: GateOutcome,
    /// Post-commit financial health.
    pub health: HealthScore,
    /// Whether the analysis entered the alert archive.
    pub archived: bool,
}

/// The assembled engine.
pub struct RiskPipeline {
    store: ProfileStore,
    engine: ScoringEngine,
    gate: DecisionGate,
    health: HealthScorer,
    archive: AlertArchive,
}

impl RiskPipeline {
    /// Assemble a pipeline from a validated configuration.
    pub fn new(config: FinGuardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: ProfileStore::new(config.store),
            engine: ScoringEngine::new(),
            gate: DecisionGate::new(config.gate),
            health: HealthScorer::new(),
            archive: AlertArchive::new(config.archive),
        })
    }

    /// Score, gate, and commit one transaction.
    pub fn process(&self, transaction: &Transaction) -> TransactionOutcome {
        self.process_reported(transaction, false)
    }

    /// Like [`process`](Self::process), with the user's own report that the
    /// session is being guided by a third party.
    pub fn process_reported(
        &self,
        transaction: &Transaction,
        user_reported_guided: bool,
    ) -> TransactionOutcome {
        let snapshot = self.store.snapshot(&transaction.user_id);
        let analysis = self.engine.analyze(transaction, &snapshot);

        let session = SessionContext {
            anomaly_score: snapshot.profile.session_anomaly_score,
            user_reported_guided,
        };
        let gate = self.gate.evaluate(&analysis, &session);

        self.store.ingest(transaction, analysis.final_risk_score);
        self.store.record_risk_event(transaction, &analysis);

        let committed = self.store.snapshot(&transaction.user_id);
        let health = self.health.assess(&committed.profile, &analysis);
        let archived = self.archive.record_if_risky(&analysis);

        info!(
            transaction_id = %transaction.id,
            user_id = %transaction.user_id,
            score = analysis.final_risk_score,
            decision = %gate.decision,
            health = health.health_score,
            archived,
            "transaction processed"
        );

        TransactionOutcome {
            analysis,
            gate,
            health,
            archived,
        }
    }

    /// Score a hypothetical transaction without committing anything.
    #[must_use]
    pub fn simulate(&self, transaction: &Transaction) -> RiskAnalysis {
        let snapshot = self.store.snapshot(&transaction.user_id);
        let analysis = self.engine.analyze(transaction, &snapshot);
        debug_assert_eq!(
            snapshot,
            self.store.snapshot(&transaction.user_id),
            "simulation must not mutate the store"
        );
        analysis
    }

    /// Apply a confirmed verdict for a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`FinGuardError::CoolingOffActive`](finguard_core::error::FinGuardError::CoolingOffActive)
    /// while the user's cooling-off period is running.
    pub fn feedback(
        &self,
        transaction: &Transaction,
        verdict: Verdict,
    ) -> Result<FeedbackEffect> {
        self.store.apply_feedback(transaction, verdict)
    }

    /// Point-in-time copy of a user's profile.
    #[must_use]
    pub fn profile(&self, user_id: &str) -> ProfileSnapshot {
        self.store.snapshot(user_id)
    }

    /// Rolling metrics for a user.
    #[must_use]
    pub fn rolling_metrics(&self, user_id: &str) -> RollingMetrics {
        self.store.rolling_metrics(user_id)
    }

    /// All archived high-risk analyses, oldest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<RiskAnalysis> {
        self.archive.list()
    }

    /// All known user ids.
    #[must_use]
    pub fn user_ids(&self) -> Vec<String> {
        self.store.user_ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finguard_core::types::Decision;

    fn pipeline() -> RiskPipeline {
        RiskPipeline::new(FinGuardConfig::development()).expect("valid config")
    }

    fn txn(id: &str, amount: f64, timestamp: &str) -> Transaction {
        Transaction::new(id, "U1", amount)
            .with_merchant("Amazon")
            .with_category("Shopping")
            .with_location("NYC")
            .with_timestamp(timestamp)
    }

    #[test]
    fn test_process_commits_and_records() {
        let p = pipeline();
        let outcome = p.process(&txn("T1", 100.0, "2026-02-22 10:00:00"));

        assert_eq!(outcome.gate.decision, Decision::Approved);
        let snap = p.profile("U1");
        assert_eq!(snap.profile.transaction_count, 1);
        assert_eq!(snap.profile.risk_history.len(), 1);
        assert_eq!(snap.profile.session_risk_timeline.len(), 1);
    }

    #[test]
    fn test_simulate_leaves_store_untouched() {
        let p = pipeline();
        p.process(&txn("T1", 100.0, "2026-02-22 10:00:00"));

        let before = p.profile("U1");
        let analysis = p.simulate(&txn("T2", 50_000.0, "2026-02-22 10:00:10"));
        assert!(analysis.final_risk_score > 0.0);
        assert_eq!(p.profile("U1"), before);
    }

    #[test]
    fn test_rejected_config() {
        let mut config = FinGuardConfig::development();
        config.gate.verify_above = 99.0;
        assert!(RiskPipeline::new(config).is_err());
    }
}
