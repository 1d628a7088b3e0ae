//! Live sequential scan source.

use std::sync::Arc;

use rapid_storage::{Relation, RowBuffer, ScanGuard, ScanStatus};
use tracing::trace;

use crate::error::{ExecError, ExecResult};
use crate::source::{ReadStatus, RowIterator, RowSource};

/// Reads a relation through a sequential scan, skipping deleted rows.
///
/// Every `init` closes the previous scan, if any, and opens a fresh one.
#[derive(Debug)]
pub struct TableScanSource {
    /// Scanned relation.
    relation: Arc<dyn Relation>,
    /// Open scan, present after `init`.
    scan: Option<ScanGuard>,
    /// Working record.
    record: RowBuffer,
    /// Whether batched reads are in progress.
    batch_mode: bool,
    /// Rows returned since construction.
    rows_read: u64,
}

impl TableScanSource {
    /// Creates a source over `relation`. No scan is opened until `init`.
    pub fn new(relation: Arc<dyn Relation>) -> Self {
        let row_length = relation.descriptor().row_length();
        Self {
            relation,
            scan: None,
            record: RowBuffer::new(row_length),
            batch_mode: false,
            rows_read: 0,
        }
    }

    /// Returns true while batched reads are in progress.
    pub fn in_batch_mode(&self) -> bool {
        self.batch_mode
    }

    /// Returns the number of rows returned since construction.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Returns true if a scan is open.
    pub fn is_open(&self) -> bool {
        self.scan.is_some()
    }
}

impl RowIterator for TableScanSource {
    fn init(&mut self) -> ExecResult<()> {
        // Close before reopening so at most one scan is open per source.
        self.scan = None;
        self.scan = Some(ScanGuard::open(self.relation.as_ref(), true)?);
        self.record.set_null_row(false);
        Ok(())
    }

    fn read(&mut self) -> ExecResult<ReadStatus> {
        let Some(scan) = self.scan.as_mut() else {
            return Err(ExecError::NotInitialized("table scan"));
        };

        loop {
            match scan.next_row(self.record.as_mut_slice())? {
                ScanStatus::Row => {
                    self.record.set_null_row(false);
                    self.rows_read += 1;
                    return Ok(ReadStatus::Row);
                }
                ScanStatus::Deleted => continue,
                ScanStatus::EndOfData => return Ok(ReadStatus::EndOfData),
            }
        }
    }

    fn set_null_row_flag(&mut self, is_null_row: bool) {
        self.record.set_null_row(is_null_row);
    }

    fn start_batch_mode(&mut self) {
        self.batch_mode = true;
        trace!(relation = %self.relation.descriptor().key(), "batch mode started");
    }

    fn end_batch_mode_if_started(&mut self) {
        if self.batch_mode {
            self.batch_mode = false;
            trace!(relation = %self.relation.descriptor().key(), "batch mode ended");
        }
    }
}

impl RowSource for TableScanSource {
    fn record(&self) -> &RowBuffer {
        &self.record
    }

    fn record_mut(&mut self) -> &mut RowBuffer {
        &mut self.record
    }

    fn relation(&self) -> Option<Arc<dyn Relation>> {
        Some(Arc::clone(&self.relation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapid_common::RelationKey;
    use rapid_storage::MemRelation;

    fn create_source(rows: u8) -> (MemRelation, TableScanSource) {
        let relation =
            MemRelation::with_rows(RelationKey::new("test", "dim"), 2, (0..rows).map(|i| [i, i]))
                .unwrap();
        let source = TableScanSource::new(Arc::new(relation.clone()));
        (relation, source)
    }

    fn collect(source: &mut TableScanSource) -> Vec<Vec<u8>> {
        let mut rows = Vec::new();
        while source.read().unwrap() == ReadStatus::Row {
            rows.push(source.record().as_slice().to_vec());
        }
        rows
    }

    #[test]
    fn test_read_before_init() {
        let (_, mut source) = create_source(1);
        assert!(matches!(
            source.read(),
            Err(ExecError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_scan_skips_deleted() {
        let (relation, mut source) = create_source(3);
        relation.delete(1).unwrap();

        source.init().unwrap();
        assert_eq!(collect(&mut source), vec![vec![0, 0], vec![2, 2]]);
        assert_eq!(source.read().unwrap(), ReadStatus::EndOfData);
        assert_eq!(source.rows_read(), 2);
    }

    #[test]
    fn test_reinit_restarts_and_closes() {
        let (relation, mut source) = create_source(2);

        source.init().unwrap();
        assert_eq!(collect(&mut source).len(), 2);
        source.init().unwrap();
        assert_eq!(collect(&mut source).len(), 2);

        assert_eq!(relation.scans_opened(), 2);
        assert_eq!(relation.scans_closed(), 1);
        drop(source);
        assert_eq!(relation.scans_closed(), 2);
    }

    #[test]
    fn test_read_error_propagates() {
        let (relation, mut source) = create_source(3);
        relation.fail_read_at(Some(1));

        source.init().unwrap();
        assert_eq!(source.read().unwrap(), ReadStatus::Row);
        assert!(matches!(source.read(), Err(ExecError::Storage(_))));
    }

    #[test]
    fn test_null_flag_cleared_by_init() {
        let (_, mut source) = create_source(1);
        source.set_null_row_flag(true);
        assert!(source.record().is_null_row());

        source.init().unwrap();
        assert!(!source.record().is_null_row());
    }

    #[test]
    fn test_batch_mode() {
        let (_, mut source) = create_source(1);
        source.start_batch_mode();
        assert!(source.in_batch_mode());
        source.end_batch_mode_if_started();
        assert!(!source.in_batch_mode());
    }
}
