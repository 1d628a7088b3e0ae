//! # rapid-exec
//!
//! Row-at-a-time execution for nested-loop joins.
//!
//! The join pulls one row from its outer source, then re-reads the inner
//! side once per outer row. When the inner relation is small enough, the
//! inner side is served from a shared [`TableSnapshot`] instead of a fresh
//! storage scan.
//!
//! - [`RowIterator`] / [`RowSource`]: the capability set every source offers
//! - [`TableScanSource`]: a live sequential scan over a [`Relation`]
//! - [`NestedLoopJoin`]: the join state machine
//! - [`JoinStats`]: outer rows, inner rows and cache hits
//!
//! [`TableSnapshot`]: rapid_cache::TableSnapshot
//! [`Relation`]: rapid_storage::Relation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod join_type;
pub mod nested_loop;
pub mod source;
pub mod stats;
pub mod table_scan;

pub use error::{ExecError, ExecResult};
pub use join_type::JoinType;
pub use nested_loop::{JoinState, NestedLoopJoin};
pub use source::{ReadStatus, RowIterator, RowSource};
pub use stats::JoinStats;
pub use table_scan::TableScanSource;
