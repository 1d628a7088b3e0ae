//! Relation descriptors.

use rapid_common::RelationKey;

/// Immutable description of a relation's record format and size estimate.
///
/// Descriptors are shared behind `Arc`. A relation publishes a fresh
/// descriptor when its statistics change rather than mutating one in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDescriptor {
    /// Schema-qualified name.
    key: RelationKey,
    /// Length of one record buffer in bytes.
    row_length: usize,
    /// Estimated number of rows (0 = unknown or empty).
    estimated_rows: u64,
}

impl RelationDescriptor {
    /// Creates a new descriptor.
    pub fn new(key: RelationKey, row_length: usize, estimated_rows: u64) -> Self {
        Self {
            key,
            row_length,
            estimated_rows,
        }
    }

    /// Returns the relation key.
    #[inline]
    pub fn key(&self) -> &RelationKey {
        &self.key
    }

    /// Returns the fixed record length in bytes.
    #[inline]
    pub fn row_length(&self) -> usize {
        self.row_length
    }

    /// Returns the row-count estimate.
    #[inline]
    pub fn estimated_rows(&self) -> u64 {
        self.estimated_rows
    }

    /// Returns a copy with a different estimate.
    pub fn with_estimated_rows(&self, estimated_rows: u64) -> Self {
        Self {
            estimated_rows,
            ..self.clone()
        }
    }
}
