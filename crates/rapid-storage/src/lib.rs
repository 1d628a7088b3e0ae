//! # rapid-storage
//!
//! Storage-side seams consumed by the snapshot cache and the join executor.
//!
//! The columnar engine's real handlers live elsewhere; this crate only pins
//! down the sequential-scan contract they satisfy:
//!
//! - [`Relation`]: descriptor plus `open_scan`
//! - [`ScanCursor`]: `next_row` into a caller buffer, then `close`
//! - [`ScanGuard`]: closes a cursor on every exit path
//! - [`RowBuffer`]: a source's fixed-length working record
//! - [`MemRelation`]: in-memory reference relation with fault injection

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod descriptor;
pub mod error;
pub mod memory;
pub mod record;
pub mod scan;

pub use descriptor::RelationDescriptor;
pub use error::{StorageError, StorageResult};
pub use memory::MemRelation;
pub use record::RowBuffer;
pub use scan::{Relation, ScanCursor, ScanGuard, ScanStatus};
