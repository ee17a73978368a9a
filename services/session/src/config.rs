//! Centralized configuration for the session service.
//!
//! All configuration is loaded from environment variables and validated
//! at startup.

use rust_common::{EnvSource, PlatformError, ProcessEnv, TracingConfig, parse_secs, parse_var};
use std::time::Duration;
use token_store::{BucketStrategy, StoreConfig};

/// Default service name used in logs.
pub const SERVICE_NAME: &str = "session-service";

/// Session service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Logging settings
    pub tracing: TracingConfig,
    /// Session store settings
    pub sessions: StoreConfig,
    /// CSRF store settings
    pub csrf: StoreConfig,
    /// Period of the background purge; zero disables it
    pub purge_interval: Duration,
    /// How long shutdown waits for background tasks
    pub shutdown_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is malformed or a store configuration
    /// is invalid.
    pub fn from_env() -> Result<Self, PlatformError> {
        Self::from_source(&ProcessEnv)
    }

    /// Load configuration from `source`.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is malformed or a store configuration
    /// is invalid.
    pub fn from_source<S>(source: &S) -> Result<Self, PlatformError>
    where
        S: EnvSource + ?Sized,
    {
        let strategy: BucketStrategy =
            parse_var(source, "BUCKET_STRATEGY", BucketStrategy::default())?;

        let sessions = StoreConfig::default()
            .with_session_timeout(parse_secs(source, "SESSION_TIMEOUT_SECS", 7200)?)
            .with_proximity(parse_secs(source, "SESSION_PROXIMITY_SECS", 600)?)
            .with_strategy(strategy)
            .with_namespace("session");

        let csrf = StoreConfig::default()
            .with_session_timeout(parse_secs(source, "CSRF_TIMEOUT_SECS", 7200)?)
            .with_proximity(parse_secs(source, "CSRF_PROXIMITY_SECS", 600)?)
            .with_strategy(strategy)
            .with_namespace("csrf");

        let config = Self {
            tracing: TracingConfig::from_env(source, SERVICE_NAME)?,
            sessions,
            csrf,
            purge_interval: parse_secs(source, "PURGE_INTERVAL_SECS", 60)?,
            shutdown_timeout: parse_secs(source, "SHUTDOWN_TIMEOUT_SECS", 10)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the store configurations.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Config`] naming the offending store.
    pub fn validate(&self) -> Result<(), PlatformError> {
        for store in [&self.sessions, &self.csrf] {
            store
                .validate()
                .map_err(|e| PlatformError::config(format!("{} store: {e}", store.namespace)))?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracing: TracingConfig::default().with_service_name(SERVICE_NAME),
            sessions: StoreConfig::default().with_namespace("session"),
            csrf: StoreConfig::default().with_namespace("csrf"),
            purge_interval: Duration::from_secs(60),
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}
