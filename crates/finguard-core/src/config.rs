//! Unified configuration.
//!
//! Provides configuration for the profile store, decision gate, and alert
//! archive, with deployment presets, environment overrides, and TOML
//! load/save.
//!
//! # Example
//!
//! ```rust,ignore
//! use finguard_core::config::FinGuardConfig;
//!
//! let config = FinGuardConfig::from_env()?;
//! config.validate()?;
//! ```

use crate::error::{FinGuardError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinGuardConfig {
    /// Profile store configuration.
    pub store: StoreConfig,
    /// Decision gate configuration.
    pub gate: GateConfig,
    /// Alert archive configuration.
    pub archive: ArchiveConfig,
    /// Environment name.
    pub environment: String,
    /// Service name.
    pub service_name: String,
}

impl Default for FinGuardConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            gate: GateConfig::default(),
            archive: ArchiveConfig::default(),
            environment: "development".to_string(),
            service_name: "finguard".to_string(),
        }
    }
}

impl FinGuardConfig {
    /// Create development configuration.
    #[must_use]
    pub fn development() -> Self {
        Self {
            gate: GateConfig::development(),
            ..Self::default()
        }
    }

    /// Create production configuration.
    #[must_use]
    pub fn production() -> Self {
        Self {
            gate: GateConfig::production(),
            environment: "production".to_string(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("FINGUARD_ENV").as_deref().unwrap_or("development") {
            "production" | "prod" => Self::production(),
            _ => Self::development(),
        };

        if let Ok(name) = std::env::var("FINGUARD_SERVICE_NAME") {
            config.service_name = name;
        }

        if let Ok(val) = std::env::var("FINGUARD_INITIAL_BALANCE") {
            if let Ok(balance) = val.parse() {
                config.store.initial_balance = balance;
            }
        }

        if let Ok(val) = std::env::var("FINGUARD_ALERT_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.archive.risk_threshold = threshold;
            }
        }

        if let Ok(val) = std::env::var("FINGUARD_BIOMETRIC_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.gate.biometric_threshold = threshold;
            }
        }

        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| FinGuardError::config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| FinGuardError::config(format!("Failed to parse config: {e}")))
    }

    /// Render the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| FinGuardError::config(format!("Failed to serialize config: {e}")))
    }

    /// Save configuration to a TOML file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_toml()?)
            .map_err(|e| FinGuardError::config(format!("Failed to write config: {e}")))?;

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.store.validate()?;
        self.gate.validate()?;

        if self.archive.risk_threshold < 0.0 || self.archive.risk_threshold > 100.0 {
            return Err(FinGuardError::config(format!(
                "archive.risk_threshold {} outside [0, 100]",
                self.archive.risk_threshold
            )));
        }

        Ok(())
    }

    /// Set environment.
    #[must_use]
    pub fn with_environment(mut self, env: impl Into<String>) -> Self {
        self.environment = env.into();
        self
    }

    /// Set service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }
}

/// Profile store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Balance assigned to a profile on lazy creation.
    pub initial_balance: f64,
    /// Cooling-off duration armed on repeated high risk or confirmed fraud.
    pub cooling_off_minutes: i64,
    /// Per-transaction risk score counted as suspicious.
    pub suspicious_score_threshold: f64,
    /// Number of suspicious transactions that arms a cooling-off period.
    pub suspicious_count_trigger: u32,
    /// Span of the recent rolling window, in seconds.
    pub recent_window_secs: i64,
    /// Span of the weekly window used for the 7-day average, in seconds.
    pub weekly_window_secs: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            cooling_off_minutes: 15,
            suspicious_score_threshold: 70.0,
            suspicious_count_trigger: 3,
            recent_window_secs: 3600,
            weekly_window_secs: 7 * 86_400,
        }
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<()> {
        if self.cooling_off_minutes <= 0 {
            return Err(FinGuardError::config("cooling_off_minutes must be positive"));
        }
        if self.suspicious_count_trigger == 0 {
            return Err(FinGuardError::config("suspicious_count_trigger must be nonzero"));
        }
        if self.recent_window_secs <= 0 || self.weekly_window_secs <= 0 {
            return Err(FinGuardError::config("window spans must be positive"));
        }
        Ok(())
    }
}

/// Decision gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Scores strictly above this are blocked.
    pub block_above: f64,
    /// Scores strictly above this (and not blocked) require verification.
    pub verify_above: f64,
    /// Scores at or above this trigger a biometric challenge.
    pub biometric_threshold: f64,
    /// Simulated verification fails for scores strictly above this.
    pub verification_fail_above: f64,
    /// Session anomaly scores strictly above this force a block.
    pub session_block_above: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl GateConfig {
    /// Development preset: eager biometric challenges.
    #[must_use]
    pub fn development() -> Self {
        Self {
            block_above: 85.0,
            verify_above: 60.0,
            biometric_threshold: 55.0,
            verification_fail_above: 85.0,
            session_block_above: 80.0,
        }
    }

    /// Production preset: biometric challenges only at high risk.
    #[must_use]
    pub fn production() -> Self {
        Self {
            biometric_threshold: 75.0,
            ..Self::development()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.verify_above >= self.block_above {
            return Err(FinGuardError::config("verify_above must be below block_above"));
        }
        if !(0.0..=100.0).contains(&self.biometric_threshold) {
            return Err(FinGuardError::config(format!(
                "biometric_threshold {} outside [0, 100]",
                self.biometric_threshold
            )));
        }
        Ok(())
    }
}

/// Alert archive configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Analyses with a final score strictly above this are archived.
    pub risk_threshold: f64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self { risk_threshold: 60.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FinGuardConfig::default();
        assert_eq!(config.environment, "development");
        assert_eq!(config.service_name, "finguard");
        assert_eq!(config.archive.risk_threshold, 60.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_differ_on_biometric_threshold() {
        let dev = FinGuardConfig::development();
        let prod = FinGuardConfig::production();
        assert_eq!(dev.gate.biometric_threshold, 55.0);
        assert_eq!(prod.gate.biometric_threshold, 75.0);
        assert_eq!(prod.environment, "production");
    }

    #[test]
    fn test_validation_rejects_bad_gate() {
        let mut config = FinGuardConfig::default();
        config.gate.verify_above = 90.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_store() {
        let mut config = FinGuardConfig::default();
        config.store.cooling_off_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = FinGuardConfig::production().with_service_name("finguard-test");
        let text = toml::to_string_pretty(&config).expect("serialize");
        let parsed: FinGuardConfig = toml::from_str(&text).expect("parse");
        assert_eq!(parsed.service_name, "finguard-test");
        assert_eq!(parsed.gate.biometric_threshold, 75.0);
    }
}
