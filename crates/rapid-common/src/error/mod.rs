//! Error handling for the Rapid engine.
//!
//! This module provides a unified error type and result alias used
//! across all Rapid components.

mod rapid;

pub use rapid::{ErrorCode, RapidError};

/// Result type alias for Rapid operations.
pub type RapidResult<T> = std::result::Result<T, RapidError>;
