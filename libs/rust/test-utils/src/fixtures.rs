//! Test fixtures.
//!
//! Fixed clocks and store configurations so that tests can reason about
//! exact bucket keys.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use token_store::{ManualClock, StoreConfig, TokenStore};

/// Fixed reference instant (2024-01-01T00:00:00Z) used as "now" in tests.
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default()
}

/// A manual clock frozen at [`epoch`].
#[must_use]
pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(epoch()))
}

/// Production-shaped session store configuration (2 hours, 10 minutes).
#[must_use]
pub fn session_store_config() -> StoreConfig {
    StoreConfig::default().with_namespace("session")
}

/// Production-shaped CSRF store configuration (2 hours, 10 minutes).
#[must_use]
pub fn csrf_store_config() -> StoreConfig {
    StoreConfig::default().with_namespace("csrf")
}

/// A configuration with short, second-granular durations.
#[must_use]
pub fn fast_config(timeout_secs: u64, proximity_secs: u64) -> StoreConfig {
    StoreConfig::default()
        .with_session_timeout(Duration::from_secs(timeout_secs))
        .with_proximity(Duration::from_secs(proximity_secs))
        .with_namespace("test")
}

/// Build a store on a fresh [`manual_clock`].
///
/// # Panics
///
/// Panics if `config` is invalid.
#[must_use]
pub fn store_with_clock<P>(config: StoreConfig) -> (TokenStore<P>, Arc<ManualClock>) {
    let clock = manual_clock();
    match TokenStore::with_clock(config, clock.clone()) {
        Ok(store) => (store, clock),
        Err(e) => panic!("fixture config rejected: {e}"),
    }
}

/// Tokens `"{prefix}_0"` .. `"{prefix}_{n-1}"`.
#[must_use]
pub fn numbered_tokens(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}_{i}")).collect()
}
