//! Row snapshot cache for small dimension relations.
//!
//! Nested-loop joins re-read their inner relation once per outer row. When
//! that inner relation is small, reading it from a columnar store again and
//! again is wasteful. This crate keeps a row-oriented copy instead:
//!
//! - **RowSnapshot**: one captured fixed-length row
//! - **TableSnapshot**: all live rows of a relation, built once, read many times
//! - **SnapshotCache**: keyed store with a build-once protocol
//! - **CacheStats / CacheUsage**: counters and a size summary
//!
//! # Example
//!
//! ```rust
//! use rapid_cache::SnapshotCache;
//! use rapid_common::RelationKey;
//! use rapid_storage::MemRelation;
//!
//! let key = RelationKey::new("tpch", "nation");
//! let nation = MemRelation::with_rows(key.clone(), 2, [[0u8, 1], [1, 2]]).unwrap();
//!
//! let cache = SnapshotCache::default();
//! let snapshot = cache.load_or_build(&key, &nation).unwrap();
//! assert_eq!(snapshot.get_row(1), Some(&[1u8, 2][..]));
//! assert_eq!(snapshot.get_row(2), None);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod snapshot;
pub mod stats;
pub mod store;

pub use error::BuildError;
pub use snapshot::{RowSnapshot, TableSnapshot};
pub use stats::{CacheStats, CacheUsage};
pub use store::SnapshotCache;
