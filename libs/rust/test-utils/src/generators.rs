//! Shared proptest generators.
//!
//! This module provides reusable generators for the values the token store
//! and the session layer operate on.

use proptest::prelude::*;
use std::time::Duration;
use token_store::{BucketStrategy, StoreConfig};

/// Length of generated session and CSRF tokens.
pub const TOKEN_LEN: usize = 128;

/// Generate full-length tokens over the URL-safe alphabet.
pub fn token_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_]{128}"
}

/// Generate short tokens; cheaper when many are needed per case.
pub fn short_token_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_]{8,24}"
}

/// Generate between `min` and `max` distinct short tokens.
pub fn distinct_tokens_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set(short_token_strategy(), min..=max)
        .prop_map(|set| set.into_iter().collect())
}

/// Generate opaque payloads.
pub fn payload_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

/// Generate user identifiers.
pub fn user_id_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000
}

/// Generate metric-safe store namespaces.
pub fn namespace_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{2,20}"
}

/// Generate either bucket strategy.
pub fn bucket_strategy_strategy() -> impl Strategy<Value = BucketStrategy> {
    prop_oneof![Just(BucketStrategy::Closest), Just(BucketStrategy::FirstMatch)]
}

/// Generate session timeouts (10 seconds to 4 hours).
pub fn timeout_strategy() -> impl Strategy<Value = Duration> {
    (10u64..14_400).prop_map(Duration::from_secs)
}

/// Generate valid store configurations with `proximity < session_timeout`.
pub fn store_config_strategy() -> impl Strategy<Value = StoreConfig> {
    (timeout_strategy(), 0u64..=100, bucket_strategy_strategy(), namespace_strategy()).prop_map(
        |(timeout, proximity_pct, strategy, namespace)| {
            let proximity = timeout.mul_f64(proximity_pct as f64 / 200.0);
            StoreConfig::default()
                .with_session_timeout(timeout)
                .with_proximity(proximity)
                .with_strategy(strategy)
                .with_namespace(namespace)
        },
    )
}

/// One step of a randomized store workload.
///
/// Token operations refer to a slot in a fixed pool of tokens so that
/// sequences revisit the same tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// Insert the token in `slot` with `payload`
    Insert {
        /// Token pool index
        slot: usize,
        /// Payload to store
        payload: i64,
    },
    /// Look up the token in `slot`
    Lookup {
        /// Token pool index
        slot: usize,
    },
    /// Remove the token in `slot`
    Remove {
        /// Token pool index
        slot: usize,
    },
    /// Move the clock forward
    Advance {
        /// Milliseconds to advance
        millis: i64,
    },
    /// Purge expired buckets
    Purge,
}

/// Generate a workload step over a pool of `slots` tokens.
pub fn store_op_strategy(slots: usize) -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        4 => (0..slots, payload_strategy())
            .prop_map(|(slot, payload)| StoreOp::Insert { slot, payload }),
        3 => (0..slots).prop_map(|slot| StoreOp::Lookup { slot }),
        2 => (0..slots).prop_map(|slot| StoreOp::Remove { slot }),
        2 => (0i64..5_000).prop_map(|millis| StoreOp::Advance { millis }),
        1 => Just(StoreOp::Purge),
    ]
}

/// Generate a workload of up to `max_len` steps.
pub fn store_ops_strategy(slots: usize, max_len: usize) -> impl Strategy<Value = Vec<StoreOp>> {
    prop::collection::vec(store_op_strategy(slots), 1..=max_len)
}
