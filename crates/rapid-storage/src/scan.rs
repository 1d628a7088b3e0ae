//! Sequential-scan read API.
//!
//! A [`Relation`] hands out [`ScanCursor`]s. A cursor reads rows in storage
//! order into a caller-provided buffer and must be closed once the caller is
//! done with it. [`ScanGuard`] ties the close to scope exit so that every
//! path out of a scan loop, including `?` on an error, releases the cursor.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::descriptor::RelationDescriptor;
use super::error::StorageResult;

/// Outcome of a single cursor read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// A row was written into the buffer.
    Row,
    /// The slot at the cursor position holds a deleted row; nothing was written.
    Deleted,
    /// The scan is exhausted.
    EndOfData,
}

/// An open sequential scan.
pub trait ScanCursor: Send {
    /// Reads the next row into `buf`.
    fn next_row(&mut self, buf: &mut [u8]) -> StorageResult<ScanStatus>;

    /// Ends the scan. Calling it more than once is harmless.
    fn close(&mut self);
}

/// A scannable relation.
pub trait Relation: Send + Sync + fmt::Debug {
    /// Returns the current descriptor.
    fn descriptor(&self) -> Arc<RelationDescriptor>;

    /// Opens a sequential scan positioned before the first row.
    ///
    /// `reuse_position` is a hint that the caller intends a plain forward
    /// scan and the storage layer may reuse any positioning state it keeps.
    fn open_scan(&self, reuse_position: bool) -> StorageResult<Box<dyn ScanCursor>>;
}

/// Closes the wrapped cursor when dropped.
pub struct ScanGuard {
    cursor: Box<dyn ScanCursor>,
}

impl ScanGuard {
    /// Opens a scan on `relation` and guards it.
    pub fn open(relation: &dyn Relation, reuse_position: bool) -> StorageResult<Self> {
        let cursor = relation.open_scan(reuse_position)?;
        Ok(Self { cursor })
    }
}

impl fmt::Debug for ScanGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanGuard").finish_non_exhaustive()
    }
}

impl Deref for ScanGuard {
    type Target = dyn ScanCursor;

    fn deref(&self) -> &Self::Target {
        self.cursor.as_ref()
    }
}

impl DerefMut for ScanGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cursor.as_mut()
    }
}

impl Drop for ScanGuard {
    fn drop(&mut self) {
        self.cursor.close();
    }
}
