//! # rapid-common
//!
//! Common types, errors, and configuration for the Rapid execution engine.
//!
//! This crate provides the foundational pieces shared by the storage seams,
//! the snapshot cache, and the join executor:
//!
//! - **Types**: Relation identity (`RelationKey`)
//! - **Errors**: Unified error handling with `RapidError`
//! - **Config**: Snapshot cache and join configuration
//! - **Constants**: Caching thresholds and limits
//!
//! ## Example
//!
//! ```rust
//! use rapid_common::types::RelationKey;
//! use rapid_common::error::RapidResult;
//!
//! fn example() -> RapidResult<()> {
//!     let key: RelationKey = "sales.region".parse()?;
//!     assert_eq!(key.schema(), "sales");
//!     assert_eq!(key.to_string(), "sales.region");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items at the crate root
pub use config::{CacheConfig, JoinConfig, RapidConfig};
pub use constants::*;
pub use error::{ErrorCode, RapidError, RapidResult};
pub use types::RelationKey;
