//! Storage errors.

use rapid_common::{RapidError, RelationKey};
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while scanning a relation.
#[derive(Debug, Error)]
#[allow(missing_docs)] // Fields are documented by variant docs
pub enum StorageError {
    /// A sequential scan could not be opened.
    #[error("cannot open scan on {relation}: {reason}")]
    ScanOpen {
        relation: RelationKey,
        reason: String,
    },

    /// Reading the next row failed.
    #[error("read from {relation} failed: {reason}")]
    Read {
        relation: RelationKey,
        reason: String,
    },

    /// A row does not fit the destination buffer.
    #[error("row buffer length mismatch: expected {expected} bytes, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    /// The cursor was used after it was closed.
    #[error("scan on {relation} is closed")]
    ScanClosed { relation: RelationKey },

    /// Row index is outside the relation.
    #[error("row {index} not found in {relation}")]
    RowNotFound { relation: RelationKey, index: usize },
}

impl StorageError {
    /// Creates a read error.
    pub fn read(relation: &RelationKey, reason: impl Into<String>) -> Self {
        Self::Read {
            relation: relation.clone(),
            reason: reason.into(),
        }
    }

    /// Creates a scan open error.
    pub fn scan_open(relation: &RelationKey, reason: impl Into<String>) -> Self {
        Self::ScanOpen {
            relation: relation.clone(),
            reason: reason.into(),
        }
    }

    /// Returns the relation the error concerns, if any.
    pub fn relation(&self) -> Option<&RelationKey> {
        match self {
            Self::ScanOpen { relation, .. }
            | Self::Read { relation, .. }
            | Self::ScanClosed { relation }
            | Self::RowNotFound { relation, .. } => Some(relation),
            Self::BufferLength { .. } => None,
        }
    }
}

impl From<StorageError> for RapidError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::BufferLength { expected, actual } => {
                RapidError::RowLengthMismatch { expected, actual }
            }
            other => RapidError::ScanFailed {
                relation: other
                    .relation()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                reason: other.to_string(),
            },
        }
    }
}
