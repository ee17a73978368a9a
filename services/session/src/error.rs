//! Session service errors.

use rust_common::PlatformError;
use thiserror::Error;
use token_store::StoreError;

/// Errors from session and CSRF operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Token store failure, including unknown tokens
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration or platform setup failure
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl SessionError {
    /// Whether the session or token was not found.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotFound))
    }
}

/// Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = SessionError::from(StoreError::NotFound);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Token not found");

        let err = SessionError::from(PlatformError::config("bad"));
        assert!(!err.is_not_found());
    }
}
