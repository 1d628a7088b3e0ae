//! Execution errors.

use rapid_common::RapidError;
use rapid_storage::StorageError;
use thiserror::Error;

/// Result type for execution operations.
pub type ExecResult<T> = Result<T, ExecError>;

/// Errors surfaced by row sources and the join.
///
/// End of data is not an error; it is [`ReadStatus::EndOfData`].
///
/// [`ReadStatus::EndOfData`]: crate::ReadStatus::EndOfData
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ExecError {
    /// The storage layer failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A row source failed for a reason of its own.
    #[error("row source {source_name} failed: {reason}")]
    Source { source_name: String, reason: String },

    /// A row does not fit the record buffer it was copied into.
    #[error("row length mismatch: expected {expected} bytes, got {actual}")]
    RowLength { expected: usize, actual: usize },

    /// `read` was called before a successful `init`.
    #[error("{0} read before init")]
    NotInitialized(&'static str),
}

impl ExecError {
    /// Creates a source error.
    pub fn source_failed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

impl From<ExecError> for RapidError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::Storage(source) => source.into(),
            ExecError::RowLength { expected, actual } => {
                RapidError::RowLengthMismatch { expected, actual }
            }
            other @ (ExecError::Source { .. } | ExecError::NotInitialized(_)) => {
                RapidError::ExecutionFailed {
                    reason: other.to_string(),
                }
            }
        }
    }
}
