//! In-memory relation.
//!
//! `MemRelation` is a row store held entirely in memory. It implements the
//! sequential-scan API with the same observable behavior a disk-backed
//! handler has: deleted slots are reported as [`ScanStatus::Deleted`],
//! reads fail with a [`StorageError`], and every opened scan is expected to
//! be closed. Open/close counters and fault injection make it suitable as a
//! reference implementation in tests and benchmarks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use rapid_common::RelationKey;
use tracing::trace;

use super::descriptor::RelationDescriptor;
use super::error::{StorageError, StorageResult};
use super::scan::{Relation, ScanCursor, ScanStatus};

/// Faults injected into scans.
#[derive(Debug, Default, Clone)]
struct FaultPlan {
    /// Fail every `open_scan`.
    fail_open: bool,
    /// Fail the read of this physical slot.
    fail_read_at: Option<usize>,
    /// Sleep this long inside `open_scan`.
    open_delay: Option<Duration>,
    /// Report this row estimate instead of the live row count.
    pinned_estimate: Option<u64>,
}

/// State shared between a relation and its open cursors.
#[derive(Debug)]
struct MemShared {
    /// Current descriptor.
    descriptor: RwLock<Arc<RelationDescriptor>>,
    /// Physical slots; `None` marks a deleted row.
    slots: RwLock<Vec<Option<Bytes>>>,
    /// Injected faults.
    faults: Mutex<FaultPlan>,
    /// Number of scans opened.
    scans_opened: AtomicU64,
    /// Number of scans closed.
    scans_closed: AtomicU64,
    /// Number of rows returned by cursors.
    rows_read: AtomicU64,
}

impl MemShared {
    fn key(&self) -> RelationKey {
        self.descriptor.read().key().clone()
    }
}

/// An in-memory relation of fixed-length rows.
///
/// Cheap to clone; clones share rows, counters and faults.
#[derive(Debug, Clone)]
pub struct MemRelation {
    shared: Arc<MemShared>,
}

impl MemRelation {
    /// Creates an empty relation.
    pub fn new(key: RelationKey, row_length: usize) -> Self {
        Self {
            shared: Arc::new(MemShared {
                descriptor: RwLock::new(Arc::new(RelationDescriptor::new(key, row_length, 0))),
                slots: RwLock::new(Vec::new()),
                faults: Mutex::new(FaultPlan::default()),
                scans_opened: AtomicU64::new(0),
                scans_closed: AtomicU64::new(0),
                rows_read: AtomicU64::new(0),
            }),
        }
    }

    /// Creates a relation pre-populated with `rows`.
    pub fn with_rows<I, R>(key: RelationKey, row_length: usize, rows: I) -> StorageResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[u8]>,
    {
        let relation = Self::new(key, row_length);
        for row in rows {
            relation.insert(row.as_ref())?;
        }
        Ok(relation)
    }

    /// Reports `estimate` as the row-count estimate regardless of content.
    ///
    /// Models storage statistics that have gone stale.
    pub fn pin_estimate(self, estimate: u64) -> Self {
        self.shared.faults.lock().pinned_estimate = Some(estimate);
        self.publish_descriptor();
        self
    }

    /// Returns the relation key.
    pub fn key(&self) -> RelationKey {
        self.shared.key()
    }

    /// Appends a row and returns its slot index.
    pub fn insert(&self, row: &[u8]) -> StorageResult<usize> {
        let row_length = self.shared.descriptor.read().row_length();
        if row.len() != row_length {
            return Err(StorageError::BufferLength {
                expected: row_length,
                actual: row.len(),
            });
        }

        let index = {
            let mut slots = self.shared.slots.write();
            slots.push(Some(Bytes::copy_from_slice(row)));
            slots.len() - 1
        };
        self.publish_descriptor();
        Ok(index)
    }

    /// Marks the row in `index` as deleted.
    pub fn delete(&self, index: usize) -> StorageResult<()> {
        {
            let mut slots = self.shared.slots.write();
            match slots.get_mut(index) {
                Some(slot) => *slot = None,
                None => {
                    return Err(StorageError::RowNotFound {
                        relation: self.key(),
                        index,
                    })
                }
            }
        }
        self.publish_descriptor();
        Ok(())
    }

    /// Returns the number of live (non-deleted) rows.
    pub fn live_rows(&self) -> usize {
        self.shared
            .slots
            .read()
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    /// Makes every subsequent `open_scan` fail.
    pub fn fail_open(&self, fail: bool) {
        self.shared.faults.lock().fail_open = fail;
    }

    /// Makes reads of physical slot `index` fail. `None` clears the fault.
    pub fn fail_read_at(&self, index: Option<usize>) {
        self.shared.faults.lock().fail_read_at = index;
    }

    /// Delays every `open_scan` by `delay`.
    pub fn delay_open(&self, delay: Option<Duration>) {
        self.shared.faults.lock().open_delay = delay;
    }

    /// Returns the number of scans opened so far.
    pub fn scans_opened(&self) -> u64 {
        self.shared.scans_opened.load(Ordering::Relaxed)
    }

    /// Returns the number of scans closed so far.
    pub fn scans_closed(&self) -> u64 {
        self.shared.scans_closed.load(Ordering::Relaxed)
    }

    /// Returns the number of rows handed out by cursors so far.
    pub fn rows_read(&self) -> u64 {
        self.shared.rows_read.load(Ordering::Relaxed)
    }

    fn publish_descriptor(&self) {
        let pinned = self.shared.faults.lock().pinned_estimate;
        let estimate = pinned.unwrap_or_else(|| self.live_rows() as u64);
        let mut descriptor = self.shared.descriptor.write();
        *descriptor = Arc::new(descriptor.with_estimated_rows(estimate));
    }
}

impl Relation for MemRelation {
    fn descriptor(&self) -> Arc<RelationDescriptor> {
        Arc::clone(&self.shared.descriptor.read())
    }

    fn open_scan(&self, reuse_position: bool) -> StorageResult<Box<dyn ScanCursor>> {
        let faults = self.shared.faults.lock().clone();
        if let Some(delay) = faults.open_delay {
            std::thread::sleep(delay);
        }
        if faults.fail_open {
            return Err(StorageError::scan_open(&self.key(), "injected open failure"));
        }

        self.shared.scans_opened.fetch_add(1, Ordering::Relaxed);
        trace!(relation = %self.key(), reuse_position, "scan opened");
        Ok(Box::new(MemCursor {
            shared: Arc::clone(&self.shared),
            position: 0,
            closed: false,
        }))
    }
}

/// Cursor over a [`MemRelation`].
struct MemCursor {
    shared: Arc<MemShared>,
    position: usize,
    closed: bool,
}

impl ScanCursor for MemCursor {
    fn next_row(&mut self, buf: &mut [u8]) -> StorageResult<ScanStatus> {
        if self.closed {
            return Err(StorageError::ScanClosed {
                relation: self.shared.key(),
            });
        }

        if self.shared.faults.lock().fail_read_at == Some(self.position) {
            return Err(StorageError::read(
                &self.shared.key(),
                format!("injected read failure at slot {}", self.position),
            ));
        }

        let slots = self.shared.slots.read();
        let Some(slot) = slots.get(self.position) else {
            return Ok(ScanStatus::EndOfData);
        };
        self.position += 1;

        match slot {
            None => Ok(ScanStatus::Deleted),
            Some(row) => {
                if row.len() != buf.len() {
                    return Err(StorageError::BufferLength {
                        expected: buf.len(),
                        actual: row.len(),
                    });
                }
                buf.copy_from_slice(row);
                self.shared.rows_read.fetch_add(1, Ordering::Relaxed);
                Ok(ScanStatus::Row)
            }
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.shared.scans_closed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::ScanGuard;

    fn create_test_relation() -> MemRelation {
        MemRelation::with_rows(RelationKey::new("test", "dim"), 2, [[1u8, 1], [2, 2], [3, 3]])
            .unwrap()
    }

    fn drain(relation: &MemRelation) -> StorageResult<Vec<ScanStatus>> {
        let mut scan = ScanGuard::open(relation, true)?;
        let mut buf = [0u8; 2];
        let mut statuses = Vec::new();
        loop {
            let status = scan.next_row(&mut buf)?;
            statuses.push(status);
            if status == ScanStatus::EndOfData {
                return Ok(statuses);
            }
        }
    }

    #[test]
    fn test_scan_in_insertion_order() {
        let relation = create_test_relation();
        let mut scan = ScanGuard::open(&relation, true).unwrap();
        let mut buf = [0u8; 2];

        for expected in 1..=3u8 {
            assert_eq!(scan.next_row(&mut buf).unwrap(), ScanStatus::Row);
            assert_eq!(buf, [expected, expected]);
        }
        assert_eq!(scan.next_row(&mut buf).unwrap(), ScanStatus::EndOfData);
        assert_eq!(scan.next_row(&mut buf).unwrap(), ScanStatus::EndOfData);
    }

    #[test]
    fn test_deleted_rows_reported() {
        let relation = create_test_relation();
        relation.delete(1).unwrap();

        let statuses = drain(&relation).unwrap();
        assert_eq!(
            statuses,
            vec![
                ScanStatus::Row,
                ScanStatus::Deleted,
                ScanStatus::Row,
                ScanStatus::EndOfData
            ]
        );
        assert_eq!(relation.live_rows(), 2);
        assert_eq!(relation.descriptor().estimated_rows(), 2);
    }

    #[test]
    fn test_guard_closes_on_error() {
        let relation = create_test_relation();
        relation.fail_read_at(Some(1));

        assert!(drain(&relation).is_err());
        assert_eq!(relation.scans_opened(), 1);
        assert_eq!(relation.scans_closed(), 1);
    }

    #[test]
    fn test_open_failure() {
        let relation = create_test_relation();
        relation.fail_open(true);
        assert!(relation.open_scan(true).is_err());
        assert_eq!(relation.scans_opened(), 0);

        relation.fail_open(false);
        assert!(drain(&relation).is_ok());
    }

    #[test]
    fn test_insert_rejects_wrong_length() {
        let relation = create_test_relation();
        assert!(relation.insert(&[1, 2, 3]).is_err());
        assert_eq!(relation.live_rows(), 3);
    }

    #[test]
    fn test_pinned_estimate() {
        let relation = create_test_relation().pin_estimate(1);
        relation.insert(&[4, 4]).unwrap();
        assert_eq!(relation.descriptor().estimated_rows(), 1);
        assert_eq!(relation.live_rows(), 4);
    }

    #[test]
    fn test_closed_cursor_rejects_reads() {
        let relation = create_test_relation();
        let mut cursor = relation.open_scan(true).unwrap();
        cursor.close();
        cursor.close();
        assert_eq!(relation.scans_closed(), 1);

        let mut buf = [0u8; 2];
        assert!(matches!(
            cursor.next_row(&mut buf),
            Err(StorageError::ScanClosed { .. })
        ));
    }
}
