//! Session service.
//!
//! Session and CSRF token lifecycle for the forum web tier, built on two
//! expiring token stores:
//! - login, logout and per-request session resolution
//! - CSRF tokens bound to a session and revoked with it
//! - purging of expired tokens before each request and on a timer

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod manager;
pub mod purge;
pub mod session;
pub mod token;

pub use config::Config;
pub use error::{SessionError, SessionResult};
pub use manager::{PurgeReport, SessionManager};
pub use purge::spawn_purge_task;
pub use session::{CsrfGrant, Session};
pub use token::{TOKEN_LEN, generate_token, generate_token_with_len};
