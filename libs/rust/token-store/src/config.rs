//! Store configuration.

use crate::error::{StoreError, StoreResult};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for both configured durations.
///
/// Keeps `now + session_timeout` far away from the representable range of
/// `DateTime<Utc>`.
pub const MAX_DURATION: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// How an expiry request picks among existing buckets within `proximity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketStrategy {
    /// Join the bucket whose key is nearest to the requested expiry.
    /// Ties go to the earlier key.
    #[default]
    Closest,
    /// Join the earliest bucket within range.
    FirstMatch,
}

impl BucketStrategy {
    /// Name used in configuration files and environment variables.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Closest => "closest",
            Self::FirstMatch => "first-match",
        }
    }
}

impl FromStr for BucketStrategy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "closest" => Ok(Self::Closest),
            "first-match" | "first" => Ok(Self::FirstMatch),
            other => Err(StoreError::invalid_config(format!(
                "unknown bucket strategy: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for BucketStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Lifetime granted on insert and on every refresh
    pub session_timeout: Duration,
    /// Maximum distance between a requested expiry and a bucket it may join.
    /// Must be shorter than `session_timeout`, otherwise a touched token
    /// could join a bucket that is already due.
    pub proximity: Duration,
    /// Bucket selection policy
    pub strategy: BucketStrategy,
    /// Label for logs and prefix for metric names
    pub namespace: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_secs(2 * 60 * 60),
            proximity: Duration::from_secs(10 * 60),
            strategy: BucketStrategy::default(),
            namespace: "tokens".to_string(),
        }
    }
}

impl StoreConfig {
    /// Create config with custom session timeout.
    #[must_use]
    pub const fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// Create config with custom proximity.
    #[must_use]
    pub const fn with_proximity(mut self, proximity: Duration) -> Self {
        self.proximity = proximity;
        self
    }

    /// Create config with custom bucket strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: BucketStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Create config with custom namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the timeout is zero, either
    /// duration exceeds [`MAX_DURATION`], `proximity` is not shorter than
    /// `session_timeout`, or the namespace is not a valid metric-name
    /// prefix.
    pub fn validate(&self) -> StoreResult<()> {
        if self.session_timeout.is_zero() {
            return Err(StoreError::invalid_config("session_timeout must be non-zero"));
        }
        if self.session_timeout > MAX_DURATION {
            return Err(StoreError::invalid_config("session_timeout is too large"));
        }
        if self.proximity > MAX_DURATION {
            return Err(StoreError::invalid_config("proximity is too large"));
        }
        if self.proximity >= self.session_timeout {
            return Err(StoreError::invalid_config(
                "proximity must be shorter than session_timeout",
            ));
        }
        if self.namespace.is_empty()
            || !self
                .namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(StoreError::invalid_config(format!(
                "namespace must match [A-Za-z0-9_]+, got {:?}",
                self.namespace
            )));
        }
        Ok(())
    }

    pub(crate) fn timeout_delta(&self) -> StoreResult<TimeDelta> {
        to_delta(self.session_timeout, "session_timeout")
    }

    pub(crate) fn proximity_delta(&self) -> StoreResult<TimeDelta> {
        to_delta(self.proximity, "proximity")
    }
}

fn to_delta(duration: Duration, field: &str) -> StoreResult<TimeDelta> {
    TimeDelta::from_std(duration)
        .map_err(|e| StoreError::invalid_config(format!("{field} out of range: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.session_timeout, Duration::from_secs(7200));
        assert_eq!(config.proximity, Duration::from_secs(600));
        assert_eq!(config.strategy, BucketStrategy::Closest);
        assert_eq!(config.namespace, "tokens");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::default()
            .with_session_timeout(Duration::from_secs(60))
            .with_proximity(Duration::from_secs(5))
            .with_strategy(BucketStrategy::FirstMatch)
            .with_namespace("csrf");

        assert_eq!(config.session_timeout, Duration::from_secs(60));
        assert_eq!(config.proximity, Duration::from_secs(5));
        assert_eq!(config.strategy, BucketStrategy::FirstMatch);
        assert_eq!(config.namespace, "csrf");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = StoreConfig::default().with_session_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_proximity_allowed() {
        let config = StoreConfig::default().with_proximity(Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_proximity_must_be_shorter_than_timeout() {
        let base = StoreConfig::default().with_session_timeout(Duration::from_secs(60));
        assert!(base.clone().with_proximity(Duration::from_secs(59)).validate().is_ok());

        for proximity in [60, 61, 3600] {
            let config = base.clone().with_proximity(Duration::from_secs(proximity));
            assert!(matches!(config.validate(), Err(StoreError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_oversized_durations_rejected() {
        let huge = MAX_DURATION + Duration::from_secs(1);
        assert!(StoreConfig::default().with_session_timeout(huge).validate().is_err());
        assert!(StoreConfig::default().with_proximity(huge).validate().is_err());
    }

    #[test]
    fn test_namespace_validation() {
        assert!(StoreConfig::default().with_namespace("").validate().is_err());
        assert!(StoreConfig::default().with_namespace("bad-name").validate().is_err());
        assert!(StoreConfig::default().with_namespace("session_v2").validate().is_ok());
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("closest".parse::<BucketStrategy>().unwrap(), BucketStrategy::Closest);
        assert_eq!(
            "First_Match".parse::<BucketStrategy>().unwrap(),
            BucketStrategy::FirstMatch
        );
        assert_eq!(" first ".parse::<BucketStrategy>().unwrap(), BucketStrategy::FirstMatch);
        assert!("random".parse::<BucketStrategy>().is_err());
        assert_eq!(BucketStrategy::FirstMatch.to_string(), "first-match");
    }

    #[test]
    fn test_deltas() {
        let config = StoreConfig::default();
        assert_eq!(config.timeout_delta().unwrap(), TimeDelta::hours(2));
        assert_eq!(config.proximity_delta().unwrap(), TimeDelta::minutes(10));
    }
}
