//! Token store error types using thiserror 2.0.
//!
//! Lookups of unknown tokens are not errors: [`TokenStore::lookup`] returns
//! `None` for them. The errors here cover caller misuse and invalid
//! configuration only.
//!
//! [`TokenStore::lookup`]: crate::TokenStore::lookup

use thiserror::Error;

/// Token store errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The token is not tracked by the store.
    ///
    /// Tokens are credentials, so the value is never carried in the error.
    #[error("Token not found")]
    NotFound,

    /// Store configuration was rejected at construction time
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Check if this error reports an untracked token.
    ///
    /// Integration layers may treat this as a soft no-op, e.g. a repeated
    /// logout.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type for token store operations.
pub type StoreResult<T> = Result<T, StoreError>;
