//! Common telemetry configuration types for obsreport components.
//!
//! Configuration is loaded from environment variables, resolved once by the
//! embedding process and then passed down explicitly. Nothing in the
//! workspace reads these variables on its own after startup.

use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable selecting the telemetry verbosity level.
pub const TELEMETRY_LEVEL_ENV: &str = "OBSREPORT_TELEMETRY_LEVEL";

/// Environment variable enabling the OpenTelemetry metrics backend.
pub const USE_OTEL_METRICS_ENV: &str = "OBSREPORT_USE_OTEL_METRICS";

/// Verbosity of the telemetry emitted by a component.
///
/// Ordered from least to most verbose; `None` disables metrics recording.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryLevel {
    /// No metrics are recorded
    None,
    /// Only the most essential metrics
    Basic,
    /// Standard set of metrics
    #[default]
    Normal,
    /// Everything, including high-cardinality detail
    Detailed,
}

impl TelemetryLevel {
    /// Whether any metrics should be recorded at this level.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, TelemetryLevel::None)
    }

    /// Lowercase name used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TelemetryLevel::None => "none",
            TelemetryLevel::Basic => "basic",
            TelemetryLevel::Normal => "normal",
            TelemetryLevel::Detailed => "detailed",
        }
    }
}

impl fmt::Display for TelemetryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TelemetryLevel {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(TelemetryLevel::None),
            "basic" => Ok(TelemetryLevel::Basic),
            "normal" => Ok(TelemetryLevel::Normal),
            "detailed" => Ok(TelemetryLevel::Detailed),
            _ => Err(CommonError::UnknownTelemetryLevel(s.to_string())),
        }
    }
}

/// Which metrics backend a receiver records item counts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsBackend {
    /// Dimensional, label-based recording through the `metrics` facade
    #[default]
    Legacy,
    /// Pre-bound OpenTelemetry counters with a fixed attribute set
    Otel,
}

impl MetricsBackend {
    /// Map the "use OpenTelemetry for metrics" toggle to a backend.
    #[must_use]
    pub const fn from_toggle(use_otel: bool) -> Self {
        if use_otel {
            MetricsBackend::Otel
        } else {
            MetricsBackend::Legacy
        }
    }
}

/// Telemetry configuration shared by every receiver of a process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Metrics verbosity (default: normal).
    pub level: TelemetryLevel,

    /// Backend used for accepted/refused counters (default: legacy).
    pub metrics_backend: MetricsBackend,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid telemetry level: {0}")]
    InvalidLevel(String),

    #[error("Invalid metrics backend toggle: {0}")]
    InvalidBackendToggle(String),
}

impl TelemetryConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let level = if let Some(value_str) = vars.get(TELEMETRY_LEVEL_ENV) {
            value_str.parse().map_err(|e| {
                ConfigError::InvalidLevel(format!(
                    "{TELEMETRY_LEVEL_ENV} must be one of none|basic|normal|detailed, got '{value_str}': {e}"
                ))
            })?
        } else {
            TelemetryLevel::default()
        };

        let metrics_backend = if let Some(value_str) = vars.get(USE_OTEL_METRICS_ENV) {
            let use_otel: bool = value_str.trim().parse().map_err(|e| {
                ConfigError::InvalidBackendToggle(format!(
                    "{USE_OTEL_METRICS_ENV} must be true or false, got '{value_str}': {e}"
                ))
            })?;
            MetricsBackend::from_toggle(use_otel)
        } else {
            MetricsBackend::default()
        };

        Ok(TelemetryConfig {
            level,
            metrics_backend,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_defaults() {
        let config = TelemetryConfig::from_vars(&HashMap::new()).expect("defaults should load");
        assert_eq!(config.level, TelemetryLevel::Normal);
        assert_eq!(config.metrics_backend, MetricsBackend::Legacy);
    }

    #[test]
    fn test_from_vars_custom_values() {
        let vars = HashMap::from([
            (TELEMETRY_LEVEL_ENV.to_string(), "Detailed".to_string()),
            (USE_OTEL_METRICS_ENV.to_string(), "true".to_string()),
        ]);

        let config = TelemetryConfig::from_vars(&vars).expect("config should load");
        assert_eq!(config.level, TelemetryLevel::Detailed);
        assert_eq!(config.metrics_backend, MetricsBackend::Otel);
    }

    #[test]
    fn test_from_vars_level_none() {
        let vars = HashMap::from([(TELEMETRY_LEVEL_ENV.to_string(), "none".to_string())]);

        let config = TelemetryConfig::from_vars(&vars).unwrap();
        assert_eq!(config.level, TelemetryLevel::None);
        assert!(!config.level.is_enabled());
    }

    #[test]
    fn test_from_vars_rejects_unknown_level() {
        let vars = HashMap::from([(TELEMETRY_LEVEL_ENV.to_string(), "verbose".to_string())]);

        let err = TelemetryConfig::from_vars(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLevel(_)));
        assert!(err.to_string().contains("verbose"));
    }

    #[test]
    fn test_from_vars_rejects_bad_toggle() {
        let vars = HashMap::from([(USE_OTEL_METRICS_ENV.to_string(), "yes".to_string())]);

        let err = TelemetryConfig::from_vars(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBackendToggle(_)));
    }

    #[test]
    fn test_level_ordering_and_enabled() {
        assert!(TelemetryLevel::None < TelemetryLevel::Basic);
        assert!(TelemetryLevel::Normal < TelemetryLevel::Detailed);
        assert!(TelemetryLevel::Basic.is_enabled());
        assert!(TelemetryLevel::Detailed.is_enabled());
    }

    #[test]
    fn test_level_serde_lowercase() {
        let json = serde_json::to_string(&TelemetryLevel::Basic).unwrap();
        assert_eq!(json, "\"basic\"");

        let config: TelemetryConfig =
            serde_json::from_str(r#"{"level":"none","metrics_backend":"otel"}"#).unwrap();
        assert_eq!(config.level, TelemetryLevel::None);
        assert_eq!(config.metrics_backend, MetricsBackend::Otel);
    }

    #[test]
    fn test_backend_from_toggle() {
        assert_eq!(MetricsBackend::from_toggle(true), MetricsBackend::Otel);
        assert_eq!(MetricsBackend::from_toggle(false), MetricsBackend::Legacy);
    }
}
