//! System-wide constants for the Rapid engine.

// =============================================================================
// Snapshot Cache Constants
// =============================================================================

/// Maximum row count a relation may have and still be cached.
///
/// Relations whose scan produces more rows than this are never cached,
/// not even partially.
pub const CACHE_ROW_THRESHOLD: usize = 10_000;

/// Upper bound accepted for a configured row threshold.
pub const MAX_CACHE_ROW_THRESHOLD: usize = 1_000_000;

/// Separator between schema and relation name in a relation key.
pub const RELATION_KEY_SEPARATOR: char = '.';
