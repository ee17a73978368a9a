//! Expiry buckets.
//!
//! Tokens whose requested expiries fall within `proximity` of each other
//! share one bucket keyed by an absolute timestamp. Buckets live in an
//! ordered map so that expired ones form a prefix and can be drained from
//! the front without looking at live buckets.

use crate::config::BucketStrategy;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{BTreeMap, HashSet};
use std::ops::Bound::{Excluded, Included};

/// Absolute expiry timestamp identifying a bucket.
pub type BucketKey = DateTime<Utc>;

/// Ordered index of buckets and their member tokens.
#[derive(Debug, Default)]
pub(crate) struct BucketIndex {
    buckets: BTreeMap<BucketKey, HashSet<String>>,
}

impl BucketIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of buckets, empty ones included.
    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Number of buckets with no members left.
    pub(crate) fn empty_count(&self) -> usize {
        self.buckets.values().filter(|tokens| tokens.is_empty()).count()
    }

    pub(crate) fn size_of(&self, key: BucketKey) -> Option<usize> {
        self.buckets.get(&key).map(HashSet::len)
    }

    pub(crate) fn earliest(&self) -> Option<BucketKey> {
        self.buckets.keys().next().copied()
    }

    /// Find a bucket with `|requested - key| < proximity`.
    pub(crate) fn find(
        &self,
        requested: BucketKey,
        proximity: TimeDelta,
        strategy: BucketStrategy,
    ) -> Option<BucketKey> {
        if proximity <= TimeDelta::zero() {
            return None;
        }
        let lower = requested - proximity;
        let upper = requested + proximity;

        match strategy {
            BucketStrategy::FirstMatch => self
                .buckets
                .range((Excluded(lower), Excluded(upper)))
                .next()
                .map(|(key, _)| *key),
            BucketStrategy::Closest => {
                let below = self
                    .buckets
                    .range((Excluded(lower), Included(requested)))
                    .next_back()
                    .map(|(key, _)| *key);
                let above = self
                    .buckets
                    .range((Excluded(requested), Excluded(upper)))
                    .next()
                    .map(|(key, _)| *key);

                match (below, above) {
                    (Some(b), Some(a)) if requested - b <= a - requested => Some(b),
                    (Some(_), Some(a)) => Some(a),
                    (b, a) => b.or(a),
                }
            }
        }
    }

    /// Run bucket assignment for `token`.
    ///
    /// Detaches the token from `previous` (if any), then joins the bucket
    /// chosen by [`find`](Self::find) or opens a new one at `requested`.
    /// Returns the key the token now belongs to.
    pub(crate) fn assign(
        &mut self,
        token: &str,
        previous: Option<BucketKey>,
        requested: BucketKey,
        proximity: TimeDelta,
        strategy: BucketStrategy,
    ) -> BucketKey {
        if let Some(previous) = previous {
            let detached = self.detach(previous, token);
            debug_assert!(detached, "token was not a member of its recorded bucket");
        }

        let key = self.find(requested, proximity, strategy).unwrap_or(requested);
        self.buckets.entry(key).or_default().insert(token.to_owned());
        key
    }

    /// Remove `token` from bucket `key`. The bucket itself is kept.
    ///
    /// Returns `false` if the bucket or the membership did not exist.
    pub(crate) fn detach(&mut self, key: BucketKey, token: &str) -> bool {
        self.buckets
            .get_mut(&key)
            .is_some_and(|tokens| tokens.remove(token))
    }

    /// Pop the earliest bucket if its key is at or before `now`.
    pub(crate) fn pop_expired(&mut self, now: BucketKey) -> Option<(BucketKey, HashSet<String>)> {
        let entry = self.buckets.first_entry()?;
        if *entry.key() > now {
            return None;
        }
        Some(entry.remove_entry())
    }
}
