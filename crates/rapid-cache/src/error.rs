//! Snapshot build errors.
//!
//! These never leave the crate through [`SnapshotCache`]: the store turns
//! them into "no snapshot available" and the caller falls back to live scans.
//!
//! [`SnapshotCache`]: crate::SnapshotCache

use rapid_common::RelationKey;
use rapid_storage::StorageError;
use thiserror::Error;

/// Why a snapshot could not be built.
#[derive(Debug, Error)]
#[allow(missing_docs)] // Fields are documented by variant docs
pub enum BuildError {
    /// The scan failed to open or failed mid-way.
    #[error("snapshot build of {relation} aborted: {source}")]
    Aborted {
        relation: RelationKey,
        #[source]
        source: StorageError,
    },

    /// The relation holds more rows than the threshold allows.
    #[error("{relation} exceeds the snapshot threshold of {threshold} rows")]
    Oversize {
        relation: RelationKey,
        threshold: usize,
    },
}

impl BuildError {
    /// Returns the relation the build was for.
    pub fn relation(&self) -> &RelationKey {
        match self {
            Self::Aborted { relation, .. } | Self::Oversize { relation, .. } => relation,
        }
    }

    /// Returns true if the build failed because of size, not an error.
    pub fn is_oversize(&self) -> bool {
        matches!(self, Self::Oversize { .. })
    }
}
