//! Cache statistics for monitoring and debugging.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for snapshot cache operations.
///
/// Updated with relaxed atomics; values only grow.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Total number of lookups (`load_or_build` and `get_if_present`).
    lookups: AtomicU64,
    /// Lookups answered from an existing entry.
    hits: AtomicU64,
    /// Lookups that found no entry.
    misses: AtomicU64,
    /// Snapshots built and inserted.
    builds: AtomicU64,
    /// Builds aborted by a scan error.
    aborted_builds: AtomicU64,
    /// Builds abandoned because the relation exceeded the threshold.
    oversize_skips: AtomicU64,
    /// Number of `clear` calls.
    clears: AtomicU64,
}

impl CacheStats {
    /// Creates new statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup.
    #[inline]
    pub fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a lookup hit.
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a lookup miss.
    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a completed build.
    #[inline]
    pub fn record_build(&self) {
        self.builds.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a build aborted by an error.
    #[inline]
    pub fn record_aborted_build(&self) {
        self.aborted_builds.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a build skipped for size.
    #[inline]
    pub fn record_oversize_skip(&self) {
        self.oversize_skips.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a clear.
    #[inline]
    pub fn record_clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns total lookups.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Returns lookup hits.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns lookup misses.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Returns completed builds.
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    /// Returns builds aborted by errors.
    pub fn aborted_builds(&self) -> u64 {
        self.aborted_builds.load(Ordering::Relaxed)
    }

    /// Returns builds skipped for size.
    pub fn oversize_skips(&self) -> u64 {
        self.oversize_skips.load(Ordering::Relaxed)
    }

    /// Returns the number of clears.
    pub fn clears(&self) -> u64 {
        self.clears.load(Ordering::Relaxed)
    }

    /// Returns the hit ratio (0.0 to 1.0).
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.lookups();
        if lookups == 0 {
            0.0
        } else {
            self.hits() as f64 / lookups as f64
        }
    }
}

impl Clone for CacheStats {
    fn clone(&self) -> Self {
        Self {
            lookups: AtomicU64::new(self.lookups()),
            hits: AtomicU64::new(self.hits()),
            misses: AtomicU64::new(self.misses()),
            builds: AtomicU64::new(self.builds()),
            aborted_builds: AtomicU64::new(self.aborted_builds()),
            oversize_skips: AtomicU64::new(self.oversize_skips()),
            clears: AtomicU64::new(self.clears()),
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ lookups: {}, hits: {}, misses: {}, hit_ratio: {:.2}%, builds: {}, aborted: {}, oversize: {} }}",
            self.lookups(),
            self.hits(),
            self.misses(),
            self.hit_ratio() * 100.0,
            self.builds(),
            self.aborted_builds(),
            self.oversize_skips()
        )
    }
}

/// Point-in-time summary of what the cache holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheUsage {
    /// Number of relations with a snapshot.
    pub cached_relation_count: usize,
    /// Rows across all snapshots.
    pub total_cached_rows: usize,
    /// Sum of rows times row length across all snapshots.
    pub approx_bytes_used: usize,
}

impl fmt::Display for CacheUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} relations, {} rows, ~{} bytes",
            self.cached_relation_count, self.total_cached_rows, self.approx_bytes_used
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_stats() {
        let stats = CacheStats::new();

        stats.record_lookup();
        stats.record_hit();
        stats.record_lookup();
        stats.record_miss();
        stats.record_build();

        assert_eq!(stats.lookups(), 2);
        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.builds(), 1);
        assert!((stats.hit_ratio() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_clone() {
        let stats = CacheStats::new();
        stats.record_aborted_build();
        stats.record_clear();

        let cloned = stats.clone();
        assert_eq!(cloned.aborted_builds(), 1);
        assert_eq!(cloned.clears(), 1);
    }

    #[test]
    fn test_usage_display() {
        let usage = CacheUsage {
            cached_relation_count: 2,
            total_cached_rows: 30,
            approx_bytes_used: 480,
        };
        assert_eq!(usage.to_string(), "2 relations, 30 rows, ~480 bytes");
    }
}
