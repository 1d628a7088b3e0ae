//! Join counters.

use std::fmt;

/// Counters of one join execution. Monotonic between `init` calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Outer rows read.
    pub outer_rows_scanned: u64,
    /// Inner rows read from the live source.
    pub inner_rows_scanned: u64,
    /// Inner rows served from a snapshot.
    pub cache_hits: u64,
}

impl JoinStats {
    /// Returns true if any inner row was served from a snapshot.
    #[inline]
    pub fn used_cache(&self) -> bool {
        self.cache_hits > 0
    }
}

impl fmt::Display for JoinStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "outer: {}, inner: {}, cache hits: {}",
            self.outer_rows_scanned, self.inner_rows_scanned, self.cache_hits
        )
    }
}
