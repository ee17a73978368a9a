//! Per-store metrics.

use rust_common::{Counter, Gauge, render};

/// Counters and gauges for one token store.
///
/// Metric names are prefixed with the store namespace, so a session store
/// and a CSRF store can be exported side by side.
#[derive(Debug)]
pub struct StoreMetrics {
    /// Tokens inserted (including overwrites)
    pub inserted: Counter,
    /// Lookups that found a live token
    pub lookup_hits: Counter,
    /// Lookups for unknown tokens
    pub lookup_misses: Counter,
    /// Tokens removed explicitly
    pub removed: Counter,
    /// Tokens removed by purge
    pub purged: Counter,
    /// Currently tracked tokens
    pub live_tokens: Gauge,
    /// Currently allocated buckets, empty ones included
    pub buckets: Gauge,
}

impl StoreMetrics {
    /// Create metrics for the given namespace.
    #[must_use]
    pub fn new(namespace: &str) -> Self {
        Self {
            inserted: Counter::new(
                format!("{namespace}_tokens_inserted_total"),
                "Total number of tokens inserted",
            ),
            lookup_hits: Counter::new(
                format!("{namespace}_lookup_hits_total"),
                "Total number of lookups that resolved a token",
            ),
            lookup_misses: Counter::new(
                format!("{namespace}_lookup_misses_total"),
                "Total number of lookups for unknown tokens",
            ),
            removed: Counter::new(
                format!("{namespace}_tokens_removed_total"),
                "Total number of tokens removed explicitly",
            ),
            purged: Counter::new(
                format!("{namespace}_tokens_purged_total"),
                "Total number of tokens removed by expiry purges",
            ),
            live_tokens: Gauge::new(
                format!("{namespace}_live_tokens"),
                "Current number of tracked tokens",
            ),
            buckets: Gauge::new(
                format!("{namespace}_buckets"),
                "Current number of expiry buckets",
            ),
        }
    }

    pub(crate) fn observe_sizes(&self, tokens: usize, buckets: usize) {
        self.live_tokens.set(u64::try_from(tokens).unwrap_or(u64::MAX));
        self.buckets.set(u64::try_from(buckets).unwrap_or(u64::MAX));
    }

    /// Format all metrics as Prometheus text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        render(&[
            &self.inserted,
            &self.lookup_hits,
            &self.lookup_misses,
            &self.removed,
            &self.purged,
            &self.live_tokens,
            &self.buckets,
        ])
    }
}
