//! Row snapshots of small relations.
//!
//! A [`TableSnapshot`] is an immutable, row-oriented copy of every live row
//! of a relation, taken with one sequential scan. It is built at most once
//! per cache cycle and then shared behind `Arc` by the cache and every join
//! reading it, so reads need no locking at all.
//!
//! Builds are all-or-nothing: a scan error or a row count above the
//! threshold yields no snapshot, never a truncated one.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use rapid_storage::{Relation, RelationDescriptor, ScanGuard, ScanStatus, StorageError};
use tracing::debug;

use crate::error::BuildError;

/// One captured row. Immutable and exactly `row_length` bytes long.
#[derive(Debug, PartialEq, Eq)]
pub struct RowSnapshot(Bytes);

impl RowSnapshot {
    /// Captures `src` in a single copy.
    #[inline]
    pub fn copy_from(src: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(src))
    }

    /// Returns the captured bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the row length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for a zero-length row.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An immutable snapshot of a relation's rows, in scan order.
#[derive(Debug)]
pub struct TableSnapshot {
    /// Captured rows.
    rows: Vec<RowSnapshot>,
    /// Length of every row in bytes.
    row_length: usize,
    /// Descriptor of the relation at build time. Read only for compatibility checks.
    descriptor: Arc<RelationDescriptor>,
}

impl TableSnapshot {
    /// Scans `relation` and captures all of its live rows.
    ///
    /// Deleted slots are skipped and do not count toward `threshold`. The scan
    /// is closed on every exit path.
    pub fn build(relation: &dyn Relation, threshold: usize) -> Result<Self, BuildError> {
        let descriptor = relation.descriptor();
        let relation_key = descriptor.key().clone();
        let row_length = descriptor.row_length();
        let aborted = |source: StorageError| BuildError::Aborted {
            relation: relation_key.clone(),
            source,
        };

        let start = Instant::now();
        let mut scan = ScanGuard::open(relation, true).map_err(aborted)?;
        let capacity = usize::try_from(descriptor.estimated_rows())
            .unwrap_or(threshold)
            .min(threshold);
        let mut rows = Vec::with_capacity(capacity);
        let mut record = vec![0u8; row_length];

        loop {
            match scan.next_row(&mut record).map_err(aborted)? {
                ScanStatus::Row => {
                    if rows.len() == threshold {
                        return Err(BuildError::Oversize {
                            relation: relation_key.clone(),
                            threshold,
                        });
                    }
                    rows.push(RowSnapshot::copy_from(&record));
                }
                ScanStatus::Deleted => continue,
                ScanStatus::EndOfData => break,
            }
        }
        drop(scan);

        debug!(
            relation = %relation_key,
            rows = rows.len(),
            row_length,
            elapsed_us = start.elapsed().as_micros() as u64,
            "built table snapshot"
        );

        Ok(Self {
            rows,
            row_length,
            descriptor,
        })
    }

    /// Returns the row at `index`, or `None` when out of range.
    #[inline]
    pub fn get_row(&self, index: usize) -> Option<&[u8]> {
        self.rows.get(index).map(RowSnapshot::as_bytes)
    }

    /// Returns the number of captured rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the relation had no live rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the length of every row in bytes.
    #[inline]
    pub fn row_length(&self) -> usize {
        self.row_length
    }

    /// Returns the descriptor the snapshot was built from.
    #[inline]
    pub fn descriptor(&self) -> &RelationDescriptor {
        &self.descriptor
    }

    /// Approximate payload size: rows times row length.
    pub fn approx_bytes(&self) -> usize {
        self.rows.len() * self.row_length
    }

    /// Iterates over captured rows in scan order.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.rows.iter().map(RowSnapshot::as_bytes)
    }
}
