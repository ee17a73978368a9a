//! Session and CSRF lifecycle.
//!
//! [`SessionManager`] ties two token stores together: one mapping session
//! IDs to [`Session`]s and one mapping CSRF tokens to the session they were
//! issued for. Call [`SessionManager::begin_request`] before handling each
//! request so that expired tokens are never resolved.

use crate::config::Config;
use crate::error::SessionResult;
use crate::session::{CsrfGrant, Session};
use crate::token::generate_token;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use token_store::{Clock, SystemClock, TokenStore};
use tracing::{debug, info};

/// Tokens removed by one purge of both stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    /// Expired sessions
    pub sessions: usize,
    /// Expired CSRF tokens
    pub csrf_tokens: usize,
}

impl PurgeReport {
    /// Whether nothing was purged.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sessions == 0 && self.csrf_tokens == 0
    }

    /// Total tokens purged.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.sessions + self.csrf_tokens
    }
}

/// Owns the session and CSRF stores.
pub struct SessionManager {
    sessions: Arc<TokenStore<Session>>,
    csrf: Arc<TokenStore<CsrfGrant>>,
    /// CSRF tokens issued per session, so logout can revoke them.
    csrf_by_session: Mutex<HashMap<String, HashSet<String>>>,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    /// Create a manager on the system clock.
    ///
    /// # Errors
    ///
    /// Returns error if either store configuration is invalid.
    pub fn new(config: &Config) -> SessionResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a manager whose stores share `clock`.
    ///
    /// # Errors
    ///
    /// Returns error if either store configuration is invalid.
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> SessionResult<Self> {
        let sessions = TokenStore::with_clock(config.sessions.clone(), Arc::clone(&clock))?;
        let csrf = TokenStore::with_clock(config.csrf.clone(), Arc::clone(&clock))?;

        Ok(Self {
            sessions: Arc::new(sessions),
            csrf: Arc::new(csrf),
            csrf_by_session: Mutex::new(HashMap::new()),
            clock,
        })
    }

    /// Purge both stores. Run before handling each request.
    pub fn begin_request(&self) -> PurgeReport {
        let report = PurgeReport {
            sessions: self.sessions.purge(),
            csrf_tokens: self.csrf.purge(),
        };
        if !report.is_empty() {
            self.prune_csrf_index();
        }
        report
    }

    /// Start a session for `user_id`.
    pub fn login(&self, user_id: i64) -> Session {
        let session = Session::new(user_id, self.clock.now());
        let expires = self.sessions.insert(session.session_id.clone(), session.clone());
        info!(user_id, expires = %expires, "User logged in");
        session
    }

    /// Resolve the session ID presented with a request.
    ///
    /// Returns `None` when no ID was presented or it is unknown, i.e. the
    /// request is not authenticated. A hit keeps the session alive.
    pub fn current_session(&self, session_id: Option<&str>) -> Option<Session> {
        self.sessions.lookup(session_id?)
    }

    /// End a session and revoke every CSRF token issued for it.
    ///
    /// # Errors
    ///
    /// Returns [`token_store::StoreError::NotFound`] if the session is unknown.
    pub fn logout(&self, session_id: &str) -> SessionResult<Session> {
        // Shared with `issue_csrf`: both hold the index lock across both stores.
        let mut index = self.csrf_by_session.lock();
        let session = self.sessions.remove(session_id)?;

        let issued = index.remove(session_id).unwrap_or_default();
        let revoked = issued
            .iter()
            .filter(|token| self.csrf.remove(token).is_ok())
            .count();
        drop(index);

        info!(user_id = session.user_id, csrf_revoked = revoked, "User logged out");
        Ok(session)
    }

    /// Issue a CSRF token bound to a live session.
    ///
    /// # Errors
    ///
    /// Returns [`token_store::StoreError::NotFound`] if the session is unknown.
    pub fn issue_csrf(&self, session_id: &str) -> SessionResult<String> {
        let mut index = self.csrf_by_session.lock();
        self.sessions.refresh(session_id)?;

        let token = generate_token();
        let grant = CsrfGrant {
            session_id: session_id.to_string(),
            issued_at: self.clock.now(),
        };
        self.csrf.insert(token.clone(), grant);
        index
            .entry(session_id.to_string())
            .or_default()
            .insert(token.clone());
        drop(index);

        debug!("CSRF token issued");
        Ok(token)
    }

    /// Check that `token` is a live CSRF token issued for `session_id`, and
    /// that the session is still live.
    ///
    /// Only a match keeps the token alive.
    pub fn verify_csrf(&self, token: &str, session_id: &str) -> bool {
        let Some(grant) = self.csrf.peek(token) else {
            return false;
        };
        let bound: bool = grant
            .session_id
            .as_bytes()
            .ct_eq(session_id.as_bytes())
            .into();

        bound && self.sessions.contains(session_id) && self.csrf.refresh(token).is_ok()
    }

    /// Revoke a single CSRF token.
    ///
    /// # Errors
    ///
    /// Returns [`token_store::StoreError::NotFound`] if the token is unknown.
    pub fn revoke_csrf(&self, token: &str) -> SessionResult<()> {
        let grant = self.csrf.remove(token)?;

        let mut index = self.csrf_by_session.lock();
        if let Some(tokens) = index.get_mut(&grant.session_id) {
            tokens.remove(token);
            if tokens.is_empty() {
                index.remove(&grant.session_id);
            }
        }
        Ok(())
    }

    /// Prometheus text for both stores.
    #[must_use]
    pub fn metrics_text(&self) -> String {
        let mut out = self.sessions.metrics().to_prometheus();
        out.push_str(&self.csrf.metrics().to_prometheus());
        out
    }

    /// The session store.
    #[must_use]
    pub fn sessions(&self) -> &TokenStore<Session> {
        &self.sessions
    }

    /// The CSRF store.
    #[must_use]
    pub fn csrf_tokens(&self) -> &TokenStore<CsrfGrant> {
        &self.csrf
    }

    /// Forget purged CSRF tokens and revoke those of purged sessions.
    fn prune_csrf_index(&self) {
        let mut index = self.csrf_by_session.lock();
        index.retain(|session_id, tokens| {
            if !self.sessions.contains(session_id) {
                for token in tokens.iter() {
                    self.csrf.remove(token).ok();
                }
                return false;
            }
            tokens.retain(|token| self.csrf.contains(token));
            !tokens.is_empty()
        });
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("sessions", &self.sessions)
            .field("csrf", &self.csrf)
            .finish_non_exhaustive()
    }
}
