//! The expiring token store.

use crate::bucket::{BucketIndex, BucketKey};
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::metrics::StoreMetrics;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Point-in-time size of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Tracked tokens
    pub tokens: usize,
    /// Allocated buckets, empty ones included
    pub buckets: usize,
    /// Buckets whose members were all removed or refreshed away
    pub empty_buckets: usize,
    /// Key of the earliest bucket, i.e. when the next purge can remove anything
    pub next_expiry: Option<DateTime<Utc>>,
}

struct Entry<P> {
    payload: P,
    bucket: BucketKey,
}

/// Entry map and bucket index. Always mutated together under one lock.
struct State<P> {
    entries: HashMap<String, Entry<P>>,
    buckets: BucketIndex,
}

/// In-memory token store with sliding, bucketed expiry.
///
/// Each insert or access gives a token `session_timeout` more life. Instead
/// of tracking that deadline per token, the token joins an expiry bucket
/// whose key lies within `proximity` of it, so [`purge`](Self::purge)
/// only touches expired buckets.
///
/// All operations take a single mutex for their whole duration and never
/// block on I/O. Share a store between workers with `Arc<TokenStore<P>>`.
pub struct TokenStore<P> {
    config: StoreConfig,
    timeout: TimeDelta,
    proximity: TimeDelta,
    clock: Arc<dyn Clock>,
    state: Mutex<State<P>>,
    metrics: StoreMetrics,
}

impl<P> TokenStore<P> {
    /// Create a store that reads the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a store driven by the given clock.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the configuration is invalid.
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        config.validate()?;
        let timeout = config.timeout_delta()?;
        let proximity = config.proximity_delta()?;
        let metrics = StoreMetrics::new(&config.namespace);

        Ok(Self {
            config,
            timeout,
            proximity,
            clock,
            state: Mutex::new(State {
                entries: HashMap::new(),
                buckets: BucketIndex::new(),
            }),
            metrics,
        })
    }

    /// Track `token` with `payload`, returning the bucket it expires with.
    ///
    /// Inserting a token that is already tracked replaces its payload and
    /// refreshes it.
    pub fn insert(&self, token: impl Into<String>, payload: P) -> BucketKey {
        let token = token.into();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let previous = state.entries.get(&token).map(|entry| entry.bucket);
        let key = self.assign(&mut state.buckets, &token, previous);
        state.entries.insert(token, Entry { payload, bucket: key });

        self.metrics.inserted.inc();
        self.metrics.observe_sizes(state.entries.len(), state.buckets.len());
        debug!(
            namespace = %self.config.namespace,
            bucket = %key,
            replaced = previous.is_some(),
            "Token inserted"
        );
        key
    }

    /// Extend a tracked token's life by `session_timeout` from now.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the token is not tracked.
    pub fn refresh(&self, token: &str) -> StoreResult<BucketKey> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let entry = state.entries.get_mut(token).ok_or(StoreError::NotFound)?;
        let key = self.assign(&mut state.buckets, token, Some(entry.bucket));
        entry.bucket = key;

        self.metrics.observe_sizes(state.entries.len(), state.buckets.len());
        debug!(namespace = %self.config.namespace, bucket = %key, "Token refreshed");
        Ok(key)
    }

    /// Resolve a token to its payload, refreshing it.
    ///
    /// Returns `None` for unknown tokens. This is the normal outcome for
    /// invalid or expired credentials and has no side effects.
    pub fn lookup(&self, token: &str) -> Option<P>
    where
        P: Clone,
    {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Some(entry) = state.entries.get_mut(token) else {
            self.metrics.lookup_misses.inc();
            return None;
        };
        entry.bucket = self.assign(&mut state.buckets, token, Some(entry.bucket));
        let payload = entry.payload.clone();

        self.metrics.lookup_hits.inc();
        self.metrics.observe_sizes(state.entries.len(), state.buckets.len());
        Some(payload)
    }

    /// Invalidate a token immediately and return its payload.
    ///
    /// Its bucket is left in place, even when now empty, until the next
    /// purge reaches it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the token is not tracked.
    pub fn remove(&self, token: &str) -> StoreResult<P> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let entry = state.entries.remove(token).ok_or(StoreError::NotFound)?;
        let detached = state.buckets.detach(entry.bucket, token);
        assert!(detached, "token store invariant violated: entry without bucket membership");

        self.metrics.removed.inc();
        self.metrics.observe_sizes(state.entries.len(), state.buckets.len());
        debug!(namespace = %self.config.namespace, bucket = %entry.bucket, "Token removed");
        Ok(entry.payload)
    }

    /// Drop every bucket whose key is at or before now, with all its tokens.
    ///
    /// Returns the number of tokens removed. Only expired buckets are
    /// visited, so calling this on every request is cheap.
    pub fn purge(&self) -> usize {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let now = self.clock.now();

        let mut purged = 0;
        let mut dropped_buckets = 0;
        while let Some((key, tokens)) = state.buckets.pop_expired(now) {
            for token in &tokens {
                let entry = state.entries.remove(token);
                assert!(
                    entry.is_some_and(|entry| entry.bucket == key),
                    "token store invariant violated: bucket member without matching entry"
                );
            }
            purged += tokens.len();
            dropped_buckets += 1;
        }

        if dropped_buckets == 0 {
            trace!(namespace = %self.config.namespace, "Nothing to purge");
            return 0;
        }

        self.metrics
            .purged
            .inc_by(u64::try_from(purged).unwrap_or(u64::MAX));
        self.metrics.observe_sizes(state.entries.len(), state.buckets.len());
        if purged > 0 {
            info!(
                namespace = %self.config.namespace,
                tokens = purged,
                buckets = dropped_buckets,
                "Purged expired tokens"
            );
        } else {
            debug!(
                namespace = %self.config.namespace,
                buckets = dropped_buckets,
                "Dropped empty expiry buckets"
            );
        }
        purged
    }

    /// Payload of a tracked token, without refreshing it.
    #[must_use]
    pub fn peek(&self, token: &str) -> Option<P>
    where
        P: Clone,
    {
        self.state.lock().entries.get(token).map(|entry| entry.payload.clone())
    }

    /// Bucket key a token currently expires with. Does not refresh.
    #[must_use]
    pub fn expiry_of(&self, token: &str) -> Option<BucketKey> {
        self.state.lock().entries.get(token).map(|entry| entry.bucket)
    }

    /// Whether the token is tracked. Does not refresh.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.state.lock().entries.contains_key(token)
    }

    /// Number of tracked tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether no tokens are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Number of allocated buckets, empty ones included.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.state.lock().buckets.len()
    }

    /// Number of tokens in the bucket with the given key.
    #[must_use]
    pub fn bucket_size(&self, key: BucketKey) -> Option<usize> {
        self.state.lock().buckets.size_of(key)
    }

    /// Snapshot of the store's size.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let state = self.state.lock();
        StoreStats {
            tokens: state.entries.len(),
            buckets: state.buckets.len(),
            empty_buckets: state.buckets.empty_count(),
            next_expiry: state.buckets.earliest(),
        }
    }

    /// The configuration this store was built with.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Metrics for this store.
    #[must_use]
    pub const fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    fn assign(
        &self,
        buckets: &mut BucketIndex,
        token: &str,
        previous: Option<BucketKey>,
    ) -> BucketKey {
        let requested = self.clock.now() + self.timeout;
        buckets.assign(token, previous, requested, self.proximity, self.config.strategy)
    }
}

impl<P> std::fmt::Debug for TokenStore<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::BucketStrategy;
    use std::time::Duration;

    fn store_with(
        timeout_secs: u64,
        proximity_secs: u64,
    ) -> (TokenStore<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let config = StoreConfig::default()
            .with_session_timeout(Duration::from_secs(timeout_secs))
            .with_proximity(Duration::from_secs(proximity_secs));
        let store = TokenStore::with_clock(config, clock.clone()).unwrap();
        (store, clock)
    }

    #[test]
    fn test_insert_then_lookup() {
        let (store, _clock) = store_with(60, 5);
        store.insert("t1", "payload".to_string());

        assert_eq!(store.lookup("t1"), Some("payload".to_string()));
        assert_eq!(store.len(), 1);
        assert!(store.contains("t1"));
    }

    #[test]
    fn test_lookup_unknown_is_none() {
        let (store, _clock) = store_with(60, 5);
        assert_eq!(store.lookup("missing"), None);
        assert_eq!(store.metrics().lookup_misses.get(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_peek_does_not_refresh() {
        let (store, clock) = store_with(60, 5);
        let key = store.insert("t1", "payload".to_string());

        clock.advance(TimeDelta::seconds(30));
        assert_eq!(store.peek("t1"), Some("payload".to_string()));
        assert_eq!(store.expiry_of("t1"), Some(key));
        assert_eq!(store.peek("missing"), None);
        assert_eq!(store.metrics().lookup_hits.get(), 0);
    }

    #[test]
    fn test_expiry_is_now_plus_timeout() {
        let (store, clock) = store_with(60, 5);
        let key = store.insert("t1", "p".to_string());

        assert_eq!(key, clock.now() + TimeDelta::seconds(60));
        assert_eq!(store.expiry_of("t1"), Some(key));
    }

    #[test]
    fn test_duplicate_insert_overwrites_payload() {
        let (store, clock) = store_with(60, 5);
        store.insert("t1", "old".to_string());
        clock.advance(TimeDelta::seconds(30));
        let key = store.insert("t1", "new".to_string());

        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup("t1"), Some("new".to_string()));
        assert_eq!(key, clock.now() + TimeDelta::seconds(60));
        assert_eq!(store.stats().empty_buckets, 1);
    }

    #[test]
    fn test_refresh_unknown_is_not_found() {
        let (store, _clock) = store_with(60, 5);
        assert_eq!(store.refresh("ghost"), Err(StoreError::NotFound));
    }

    #[test]
    fn test_refresh_moves_to_new_bucket() {
        let (store, clock) = store_with(3, 1);
        let first = store.insert("t1", "p".to_string());

        clock.advance(TimeDelta::seconds(2));
        let second = store.refresh("t1").unwrap();

        assert_eq!(second, clock.now() + TimeDelta::seconds(3));
        assert_eq!(store.bucket_size(first), Some(0));
        assert_eq!(store.bucket_size(second), Some(1));
    }

    #[test]
    fn test_remove() {
        let (store, _clock) = store_with(60, 5);
        let key = store.insert("t1", "p".to_string());

        assert_eq!(store.remove("t1"), Ok("p".to_string()));
        assert_eq!(store.lookup("t1"), None);
        assert_eq!(store.remove("t1"), Err(StoreError::NotFound));
        // The emptied bucket waits for purge.
        assert_eq!(store.bucket_size(key), Some(0));
    }

    #[test]
    fn test_purge_respects_bucket_key() {
        let (store, clock) = store_with(60, 5);
        store.insert("t1", "p".to_string());

        clock.advance(TimeDelta::seconds(59));
        assert_eq!(store.purge(), 0);
        assert_eq!(store.len(), 1);

        clock.advance(TimeDelta::seconds(1));
        assert_eq!(store.purge(), 1);
        assert!(store.is_empty());
        assert_eq!(store.bucket_count(), 0);
    }

    #[test]
    fn test_purge_drops_empty_buckets() {
        let (store, clock) = store_with(10, 1);
        store.insert("t1", "p".to_string());
        store.remove("t1").unwrap();
        assert_eq!(store.bucket_count(), 1);

        clock.advance(TimeDelta::seconds(10));
        assert_eq!(store.purge(), 0);
        assert_eq!(store.bucket_count(), 0);
    }

    #[test]
    fn test_first_match_strategy_joins_earliest() {
        let clock = Arc::new(ManualClock::default());
        let config = StoreConfig::default()
            .with_session_timeout(Duration::from_secs(100))
            .with_proximity(Duration::from_secs(10))
            .with_strategy(BucketStrategy::FirstMatch);
        let store: TokenStore<u32> = TokenStore::with_clock(config, clock.clone()).unwrap();

        let early = store.insert("a", 1);
        clock.advance(TimeDelta::seconds(8));
        // 8s after `early`: within proximity, joins it.
        assert_eq!(store.insert("b", 2), early);
        clock.advance(TimeDelta::seconds(8));
        // 16s after `early`: out of range, new bucket.
        let late = store.insert("c", 3);
        assert_ne!(late, early);
        clock.advance(TimeDelta::seconds(1));
        // 17s after `early`, 1s after `late`: only `late` is in range.
        assert_eq!(store.insert("d", 4), late);
    }

    #[test]
    fn test_metrics_track_operations() {
        let (store, clock) = store_with(10, 1);
        store.insert("a", "1".to_string());
        store.insert("b", "2".to_string());
        store.lookup("a");
        store.lookup("zzz");
        store.remove("b").unwrap();
        clock.advance(TimeDelta::seconds(10));
        store.purge();

        let metrics = store.metrics();
        assert_eq!(metrics.inserted.get(), 2);
        assert_eq!(metrics.lookup_hits.get(), 1);
        assert_eq!(metrics.lookup_misses.get(), 1);
        assert_eq!(metrics.removed.get(), 1);
        assert_eq!(metrics.purged.get(), 1);
        assert_eq!(metrics.live_tokens.get(), 0);
        assert_eq!(metrics.buckets.get(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = StoreConfig::default().with_session_timeout(Duration::ZERO);
        assert!(TokenStore::<()>::new(config).is_err());
    }

    #[test]
    fn test_debug_does_not_expose_tokens() {
        let (store, _clock) = store_with(10, 1);
        store.insert("secret-token-value", "p".to_string());
        let rendered = format!("{store:?}");
        assert!(!rendered.contains("secret-token-value"));
        assert!(rendered.contains("tokens: 1"));
    }
}
