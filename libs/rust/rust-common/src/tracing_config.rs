//! Tracing subscriber setup.
//!
//! Every binary in the workspace initializes logging through this module so
//! that filters and output format are driven by the same variables.

use crate::env::{EnvSource, parse_bool};
use crate::PlatformError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name attached to the startup event
    pub service_name: String,
    /// Log level filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Whether to output JSON format
    pub json_output: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "rust-service".to_string(),
            log_level: "info".to_string(),
            json_output: false,
        }
    }
}

impl TracingConfig {
    /// Create config with custom service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Create config with custom log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON output.
    #[must_use]
    pub const fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }

    /// Build the config from `SERVICE_NAME`, `LOG_LEVEL` and `LOG_JSON`,
    /// falling back to `default_service` for the name.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Config`] if `LOG_JSON` is not a boolean.
    pub fn from_env<S>(source: &S, default_service: &str) -> Result<Self, PlatformError>
    where
        S: EnvSource + ?Sized,
    {
        let service_name = source
            .get("SERVICE_NAME")
            .unwrap_or_else(|| default_service.to_string());
        let log_level = source.get("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let json_output = parse_bool(source, "LOG_JSON", false)?;

        Ok(Self {
            service_name,
            log_level,
            json_output,
        })
    }
}

/// Initialize tracing with the given configuration.
///
/// This installs the global tracing subscriber. `RUST_LOG` overrides the
/// configured level when present. Call once at application startup.
///
/// # Errors
///
/// Returns [`PlatformError::Tracing`] if the level filter is invalid or a
/// global subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) -> Result<(), PlatformError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| PlatformError::tracing(format!("Invalid log level: {e}")))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json_output {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| PlatformError::tracing(e.to_string()))?;

    tracing::info!(service = %config.service_name, "Tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.service_name, "rust-service");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_output);
    }

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::default()
            .with_service_name("session-service")
            .with_log_level("debug")
            .with_json_output();

        assert_eq!(config.service_name, "session-service");
        assert_eq!(config.log_level, "debug");
        assert!(config.json_output);
    }

    #[test]
    fn test_from_env() {
        let env: HashMap<&str, &str> = [("LOG_LEVEL", "warn"), ("LOG_JSON", "1")]
            .into_iter()
            .collect();
        let config = TracingConfig::from_env(&env, "session-service").unwrap();

        assert_eq!(config.service_name, "session-service");
        assert_eq!(config.log_level, "warn");
        assert!(config.json_output);
    }

    #[test]
    fn test_from_env_rejects_bad_flag() {
        let env: HashMap<&str, &str> = [("LOG_JSON", "sometimes")].into_iter().collect();
        assert!(TracingConfig::from_env(&env, "svc").is_err());
    }
}
