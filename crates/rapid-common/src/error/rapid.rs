//! Engine error types.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Invalid argument provided.
    InvalidArgument = 0x0003,

    // I/O errors (0x0100 - 0x01FF)
    /// General I/O error.
    Io = 0x0100,

    // Storage errors (0x0200 - 0x02FF)
    /// A sequential scan could not be opened or advanced.
    ScanFailed = 0x0200,
    /// A row did not fit the buffer it was read into.
    RowLengthMismatch = 0x0201,

    // Execution errors (0x0600 - 0x06FF)
    /// Query execution failed.
    ExecutionFailed = 0x0605,

    // Configuration errors (0x0700 - 0x07FF)
    /// Configuration is invalid or could not be parsed.
    InvalidConfig = 0x0700,
}

impl ErrorCode {
    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "I/O",
            0x02 => "Storage",
            0x06 => "Execution",
            0x07 => "Config",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The main error type for the Rapid engine.
///
/// Component crates keep their own narrower error enums and convert into
/// this type at API boundaries.
///
/// # Example
///
/// ```rust
/// use rapid_common::error::{ErrorCode, RapidError};
///
/// let err = RapidError::InvalidRelationKey { key: "orders".to_string() };
/// assert_eq!(err.code(), ErrorCode::InvalidArgument);
/// ```
#[derive(Debug, Error)]
pub enum RapidError {
    // ==========================================================================
    // General Errors
    // ==========================================================================
    /// A relation key was not of the form `schema.relation`.
    #[error("invalid relation key '{key}', expected 'schema.relation'")]
    InvalidRelationKey {
        /// The rejected key text.
        key: String,
    },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// I/O error from the underlying system.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    // ==========================================================================
    // Storage Errors
    // ==========================================================================
    /// A sequential scan failed.
    #[error("scan of '{relation}' failed: {reason}")]
    ScanFailed {
        /// The relation being scanned.
        relation: String,
        /// Reason for failure.
        reason: String,
    },

    /// A row did not match the expected fixed length.
    #[error("row length mismatch: expected {expected} bytes, got {actual}")]
    RowLengthMismatch {
        /// Expected row length.
        expected: usize,
        /// Actual row length.
        actual: usize,
    },

    // ==========================================================================
    // Execution Errors
    // ==========================================================================
    /// Query execution failed.
    #[error("query execution failed: {reason}")]
    ExecutionFailed {
        /// Reason for failure.
        reason: String,
    },

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },
}

impl RapidError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidRelationKey { .. } => ErrorCode::InvalidArgument,
            Self::Io { .. } => ErrorCode::Io,
            Self::ScanFailed { .. } => ErrorCode::ScanFailed,
            Self::RowLengthMismatch { .. } => ErrorCode::RowLengthMismatch,
            Self::ExecutionFailed { .. } => ErrorCode::ExecutionFailed,
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
        }
    }

    /// Returns true if repeating the operation later may succeed.
    ///
    /// Nothing in the engine retries on its own; this is advice for callers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::ScanFailed { .. })
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
