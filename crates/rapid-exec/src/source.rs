//! Row source capabilities.
//!
//! Sources are pull-based: `init` prepares a scan pass, `read` fills the
//! source's own record buffer with the next row. After `EndOfData`, further
//! reads keep returning `EndOfData` until the next `init`.

use std::fmt;
use std::sync::Arc;

use rapid_storage::{Relation, RowBuffer};

use crate::error::ExecResult;

/// Outcome of a successful read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// A row is available.
    Row,
    /// The source is exhausted.
    EndOfData,
}

/// Capability set of anything that produces rows one at a time.
pub trait RowIterator: fmt::Debug + Send {
    /// Prepares the iterator for a scan pass. May be called again to restart.
    fn init(&mut self) -> ExecResult<()>;

    /// Produces the next row.
    fn read(&mut self) -> ExecResult<ReadStatus>;

    /// Marks or unmarks the current row as entirely null.
    fn set_null_row_flag(&mut self, is_null_row: bool);

    /// Releases any row-level lock held for the current row.
    fn unlock_row(&mut self) {}

    /// Starts a batched-read mode for the current scan pass.
    fn start_batch_mode(&mut self) {}

    /// Ends a batched-read mode, if one was started.
    fn end_batch_mode_if_started(&mut self) {}
}

/// A row iterator with its own working record.
pub trait RowSource: RowIterator {
    /// Returns the current record.
    fn record(&self) -> &RowBuffer;

    /// Returns the current record for writing.
    fn record_mut(&mut self) -> &mut RowBuffer;

    /// Returns the relation this source scans, if it scans exactly one.
    ///
    /// Only sources that return a relation are eligible for snapshot caching.
    fn relation(&self) -> Option<Arc<dyn Relation>> {
        None
    }
}
