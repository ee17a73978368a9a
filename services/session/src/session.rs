//! Session and CSRF payloads.

use crate::token::generate_token;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session ID; also the key in the session store
    pub session_id: String,
    /// Authenticated user
    pub user_id: i64,
    /// When the user logged in
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a session with a fresh random ID.
    #[must_use]
    pub fn new(user_id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            session_id: generate_token(),
            user_id,
            created_at,
        }
    }
}

/// Payload of the CSRF store: binds a CSRF token to the session it was
/// issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrfGrant {
    /// Session the token belongs to
    pub session_id: String,
    /// Issue time
    pub issued_at: DateTime<Utc>,
}
