//! Centralized error types for all Rust libraries.
//!
//! This module provides the error type used for the cross-cutting concerns
//! of the forum-platform crates: configuration loading, observability setup
//! and other infrastructure plumbing.

use thiserror::Error;

/// Common error type for platform operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// A configuration value is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// The tracing subscriber could not be installed
    #[error("Tracing initialization failed: {0}")]
    Tracing(String),
}

impl PlatformError {
    /// Check if this error was caused by operator-supplied configuration.
    ///
    /// Configuration errors are fatal at startup and should be reported
    /// before any work is accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_common::PlatformError;
    ///
    /// let err = PlatformError::config("PORT must be a number");
    /// assert!(err.is_config());
    ///
    /// let err = PlatformError::tracing("subscriber already set");
    /// assert!(!err.is_config());
    /// ```
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Create a configuration error with the given message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a tracing setup error with the given message.
    #[must_use]
    pub fn tracing(msg: impl Into<String>) -> Self {
        Self::Tracing(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors() {
        assert!(PlatformError::config("bad").is_config());
        assert!(!PlatformError::tracing("bad").is_config());
    }

    #[test]
    fn test_error_display() {
        let err = PlatformError::config("SESSION_TIMEOUT_SECS is empty");
        assert_eq!(
            err.to_string(),
            "Configuration error: SESSION_TIMEOUT_SECS is empty"
        );

        let err = PlatformError::tracing("invalid filter");
        assert_eq!(err.to_string(), "Tracing initialization failed: invalid filter");
    }
}
