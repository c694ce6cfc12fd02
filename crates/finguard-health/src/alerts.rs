//! High-risk alert archive.
//!
//! Append-only, in-memory record of analyses whose final score crossed the
//! configured threshold. Listing returns copies; the archive itself is
//! never exposed mutably.

use finguard_core::config::ArchiveConfig;
use finguard_core::types::RiskAnalysis;
use std::sync::RwLock;
use tracing::info;

/// Thread-safe archive of high-risk analyses.
pub struct AlertArchive {
    config: ArchiveConfig,
    alerts: RwLock<Vec<RiskAnalysis>>,
}

impl Default for AlertArchive {
    fn default() -> Self {
        Self::new(ArchiveConfig::default())
    }
}

impl AlertArchive {
    /// Create an empty archive.
    #[must_use]
    pub fn new(config: ArchiveConfig) -> Self {
        Self {
            config,
            alerts: RwLock::new(Vec::new()),
        }
    }

    /// Archive the analysis when its score crosses the threshold. Returns
    /// whether it was archived.
    pub fn record_if_risky(&self, analysis: &RiskAnalysis) -> bool {
        if analysis.final_risk_score <= self.config.risk_threshold {
            return false;
        }
        info!(
            transaction_id = %analysis.transaction_id,
            score = analysis.final_risk_score,
            tag = %analysis.primary_tag,
            "high-risk analysis archived"
        );
        self.alerts.write().unwrap().push(analysis.clone());
        true
    }

    /// All archived analyses, oldest first.
    #[must_use]
    pub fn list(&self) -> Vec<RiskAnalysis> {
        self.alerts.read().unwrap().clone()
    }

    /// Number of archived analyses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alerts.read().unwrap().len()
    }

    /// Whether the archive is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all archived analyses.
    pub fn clear(&self) {
        self.alerts.write().unwrap().clear();
    }
}
