//! Process-wide snapshot store.
//!
//! [`SnapshotCache`] maps a relation key to a shared [`TableSnapshot`]. It is
//! an explicitly constructed object: the engine creates one, hands
//! `Arc<SnapshotCache>` to join setup, calls [`clear`] on schema change or
//! memory pressure, and drops it at shutdown. Tests create their own.
//!
//! # Locking
//!
//! - `build_lock` serializes every `load_or_build` and `clear` across all
//!   keys. The existence check is repeated under it, so each key is built at
//!   most once per cycle no matter how many threads ask at the same time.
//!   Builds are expected to be rare and short; a per-key lock would lift this
//!   throughput bound if they are not.
//! - `entries` is only write-locked for the insert at the end of a build and
//!   for `clear`. Lookups take the read lock and never wait for a scan.
//! - Snapshots are immutable. Readers hold an `Arc` and need no lock.
//!
//! [`clear`]: SnapshotCache::clear

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rapid_common::{CacheConfig, RelationKey};
use rapid_storage::{Relation, RelationDescriptor};
use tracing::{debug, info, warn};

use crate::error::BuildError;
use crate::snapshot::TableSnapshot;
use crate::stats::{CacheStats, CacheUsage};

/// Keyed store of shared table snapshots.
///
/// # Example
///
/// ```rust
/// use rapid_cache::SnapshotCache;
/// use rapid_common::{CacheConfig, RelationKey};
/// use rapid_storage::{MemRelation, Relation};
///
/// let key = RelationKey::new("sales", "region");
/// let region = MemRelation::with_rows(key.clone(), 4, [[1u8; 4], [2; 4]]).unwrap();
/// let cache = SnapshotCache::new(CacheConfig::default());
///
/// assert!(cache.should_cache(&region.descriptor()));
/// let snapshot = cache.load_or_build(&key, &region).unwrap();
/// assert_eq!(snapshot.row_count(), 2);
/// assert!(cache.get_if_present(&key).is_some());
/// ```
#[derive(Debug)]
pub struct SnapshotCache {
    /// Configuration.
    config: CacheConfig,
    /// Serializes builds and clears.
    build_lock: Mutex<()>,
    /// Built snapshots.
    entries: RwLock<HashMap<RelationKey, Arc<TableSnapshot>>>,
    /// Operation counters.
    stats: CacheStats,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl SnapshotCache {
    /// Creates an empty cache.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            build_lock: Mutex::new(()),
            entries: RwLock::new(HashMap::new()),
            stats: CacheStats::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns true if `descriptor` describes a caching candidate.
    ///
    /// A relation qualifies when caching is enabled and its row estimate is
    /// positive and within the threshold. Callers must ask this before
    /// [`load_or_build`]; the build itself only checks the rows it sees.
    ///
    /// [`load_or_build`]: SnapshotCache::load_or_build
    pub fn should_cache(&self, descriptor: &RelationDescriptor) -> bool {
        let estimate = descriptor.estimated_rows();
        self.config.enabled && estimate > 0 && estimate <= self.config.row_threshold as u64
    }

    /// Returns the snapshot for `key`, building it from `relation` if absent.
    ///
    /// Returns `None` when the build fails or the relation turns out to be
    /// larger than the threshold; nothing is stored in that case and a later
    /// call will try again.
    pub fn load_or_build(
        &self,
        key: &RelationKey,
        relation: &dyn Relation,
    ) -> Option<Arc<TableSnapshot>> {
        self.stats.record_lookup();
        let _build = self.build_lock.lock();

        if let Some(snapshot) = self.entries.read().get(key) {
            self.stats.record_hit();
            debug!(relation = %key, "snapshot cache hit");
            return Some(Arc::clone(snapshot));
        }
        self.stats.record_miss();

        match TableSnapshot::build(relation, self.config.row_threshold) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.entries
                    .write()
                    .insert(key.clone(), Arc::clone(&snapshot));
                self.stats.record_build();
                debug!(
                    relation = %key,
                    rows = snapshot.row_count(),
                    bytes = snapshot.approx_bytes(),
                    "snapshot cached"
                );
                Some(snapshot)
            }
            Err(err @ BuildError::Oversize { .. }) => {
                self.stats.record_oversize_skip();
                warn!(relation = %key, error = %err, "relation too large to cache");
                None
            }
            Err(err @ BuildError::Aborted { .. }) => {
                self.stats.record_aborted_build();
                warn!(relation = %key, error = %err, "snapshot build aborted");
                None
            }
        }
    }

    /// Returns the snapshot for `key` if one exists. Never builds.
    pub fn get_if_present(&self, key: &RelationKey) -> Option<Arc<TableSnapshot>> {
        self.stats.record_lookup();
        let snapshot = self.entries.read().get(key).cloned();
        if snapshot.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        snapshot
    }

    /// Drops every entry.
    ///
    /// Snapshots already handed out stay alive until their holders release them.
    pub fn clear(&self) {
        let _build = self.build_lock.lock();
        let dropped = {
            let mut entries = self.entries.write();
            let dropped = entries.len();
            entries.clear();
            dropped
        };
        self.stats.record_clear();
        info!(dropped, "snapshot cache cleared");
    }

    /// Returns a summary of the current entries.
    pub fn stats(&self) -> CacheUsage {
        let entries = self.entries.read();
        entries
            .values()
            .fold(CacheUsage::default(), |mut usage, snapshot| {
                usage.cached_relation_count += 1;
                usage.total_cached_rows += snapshot.row_count();
                usage.approx_bytes_used += snapshot.approx_bytes();
                usage
            })
    }

    /// Returns the operation counters.
    pub fn counters(&self) -> &CacheStats {
        &self.stats
    }

    /// Returns true if a snapshot for `key` exists. Does not count as a lookup.
    pub fn contains(&self, key: &RelationKey) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Returns the number of cached relations.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
