//! Caching layer for arrival snapshots.
//!
//! The upstream feed refreshes roughly every 30 seconds, so entries live for
//! 60 seconds: at most one missed refresh of staleness while bounding how
//! often we hit the feed.
//!
//! Populations that produce nothing usable are never stored. A transient
//! outage therefore costs one failed call instead of a full TTL of empty
//! boards, and a good snapshot already in the cache keeps being served until
//! it expires.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::PredicateError;
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::arrivals::ArrivalSnapshot;
use crate::error::SnapshotError;

/// Namespace half of every cache key.
pub const KEY_NAMESPACE: &str = "subway-data";

/// Tags carried by every entry, in addition to its stop id.
pub const BASE_TAGS: [&str; 2] = ["subway", "mta"];

/// Cache key: (namespace, stop id).
type SnapshotKey = (&'static str, String);

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: Arc<ArrivalSnapshot>,
    tags: Arc<[String]>,
}

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Outcome of a population attempt.
///
/// Only [`Population::Ready`] is written to the cache.
#[derive(Debug)]
pub enum Population {
    Ready(ArrivalSnapshot),
    Skip(SnapshotError),
}

impl From<Result<ArrivalSnapshot, SnapshotError>> for Population {
    fn from(result: Result<ArrivalSnapshot, SnapshotError>) -> Self {
        match result {
            Ok(snapshot) => Population::Ready(snapshot),
            Err(reason) => Population::Skip(reason),
        }
    }
}

/// Snapshot cache keyed by stop, with tag-based invalidation.
pub struct SnapshotCache {
    entries: MokaCache<SnapshotKey, CacheEntry>,
}

impl SnapshotCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .support_invalidation_closures()
            .build();

        Self { entries }
    }

    fn key(stop_id: &str) -> SnapshotKey {
        (KEY_NAMESPACE, stop_id.to_string())
    }

    /// Tags attached to the entry for `stop_id`.
    pub fn tags_for(stop_id: &str) -> Vec<String> {
        BASE_TAGS
            .iter()
            .map(|t| t.to_string())
            .chain(std::iter::once(stop_id.to_string()))
            .collect()
    }

    /// Returns the cached snapshot for `stop_id`, running `populate` on a miss.
    ///
    /// Concurrent misses on the same stop share one `populate` run. A
    /// [`Population::Skip`] is returned to every waiting caller as `Err` and
    /// leaves no entry behind.
    pub async fn get_or_populate<F>(
        &self,
        stop_id: &str,
        populate: F,
    ) -> Result<Arc<ArrivalSnapshot>, Arc<SnapshotError>>
    where
        F: Future<Output = Population>,
    {
        let entry = self
            .entries
            .entry(Self::key(stop_id))
            .or_try_insert_with(async {
                match populate.await {
                    Population::Ready(snapshot) => Ok(CacheEntry {
                        snapshot: Arc::new(snapshot),
                        tags: Self::tags_for(stop_id).into(),
                    }),
                    Population::Skip(reason) => Err(reason),
                }
            })
            .await?;

        debug!(stop_id, fresh = entry.is_fresh(), "Snapshot served from cache layer");
        Ok(entry.into_value().snapshot)
    }

    /// Current entry for `stop_id` without populating.
    pub async fn peek(&self, stop_id: &str) -> Option<Arc<ArrivalSnapshot>> {
        self.entries.get(&Self::key(stop_id)).await.map(|e| e.snapshot)
    }

    pub fn contains(&self, stop_id: &str) -> bool {
        self.entries.contains_key(&Self::key(stop_id))
    }

    /// Drops every entry tagged with `tag` (`"subway"`, `"mta"`, or a stop id).
    pub fn invalidate_tag(&self, tag: &str) -> Result<(), PredicateError> {
        debug!(tag, "Invalidating cached snapshots by tag");
        let tag = tag.to_string();
        self.entries
            .invalidate_entries_if(move |_, entry| entry.tags.iter().any(|t| *t == tag))?;
        Ok(())
    }

    pub async fn invalidate_stop(&self, stop_id: &str) {
        self.entries.invalidate(&Self::key(stop_id)).await;
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}
