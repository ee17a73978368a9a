//! Time-bucketed expiring token store.
//!
//! Holds opaque tokens (session IDs, CSRF tokens) with opaque payloads and
//! expires them in bulk. Every insert or successful lookup pushes a token's
//! expiry to `now + session_timeout`; the token then joins an existing
//! expiry bucket within `proximity` of that time, or opens a new one.
//! Purging drops whole buckets, so its cost tracks the number of expired
//! buckets rather than the number of live tokens.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use token_store::{StoreConfig, TokenStore};
//!
//! let config = StoreConfig::default()
//!     .with_session_timeout(Duration::from_secs(60))
//!     .with_proximity(Duration::from_secs(5))
//!     .with_namespace("session");
//! let store = TokenStore::new(config).unwrap();
//!
//! store.insert("token-1", 42_i64);
//! assert_eq!(store.lookup("token-1"), Some(42));
//! assert_eq!(store.lookup("token-2"), None);
//!
//! // Nothing has expired yet.
//! assert_eq!(store.purge(), 0);
//! store.remove("token-1").unwrap();
//! assert!(store.remove("token-1").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bucket;
pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
mod store;

pub use bucket::BucketKey;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BucketStrategy, MAX_DURATION, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use metrics::StoreMetrics;
pub use store::{StoreStats, TokenStore};
