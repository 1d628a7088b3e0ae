//! A row source that replays fixed rows.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rapid_exec::{ExecError, ExecResult, ReadStatus, RowIterator, RowSource};
use rapid_storage::RowBuffer;

use crate::fixtures::{encode_row, FIXTURE_ROW_LENGTH};

/// Calls observed on a [`ScriptedSource`]. Shared so tests can keep it
/// after the source moves into a join.
#[derive(Debug, Default)]
pub struct SourceCalls {
    inits: AtomicU64,
    reads: AtomicU64,
    unlocks: AtomicU64,
    batch_starts: AtomicU64,
    batch_ends: AtomicU64,
}

impl SourceCalls {
    /// Number of `init` calls.
    pub fn inits(&self) -> u64 {
        self.inits.load(Ordering::Relaxed)
    }

    /// Number of `read` calls.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of `unlock_row` calls.
    pub fn unlocks(&self) -> u64 {
        self.unlocks.load(Ordering::Relaxed)
    }

    /// Number of `start_batch_mode` calls.
    pub fn batch_starts(&self) -> u64 {
        self.batch_starts.load(Ordering::Relaxed)
    }

    /// Number of `end_batch_mode_if_started` calls.
    pub fn batch_ends(&self) -> u64 {
        self.batch_ends.load(Ordering::Relaxed)
    }
}

/// Replays the same rows on every pass. Not backed by a relation, so it is
/// never eligible for snapshot caching.
#[derive(Debug)]
pub struct ScriptedSource {
    name: String,
    rows: Vec<Vec<u8>>,
    position: usize,
    fail_on_read: Option<u64>,
    record: RowBuffer,
    calls: Arc<SourceCalls>,
}

impl ScriptedSource {
    /// Creates a source replaying fixture rows with the given ids.
    pub fn with_ids(name: impl Into<String>, ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            name: name.into(),
            rows: ids
                .into_iter()
                .map(|id| encode_row(id, FIXTURE_ROW_LENGTH))
                .collect(),
            position: 0,
            fail_on_read: None,
            record: RowBuffer::new(FIXTURE_ROW_LENGTH),
            calls: Arc::new(SourceCalls::default()),
        }
    }

    /// Fails the `read`-th call to `read` (1-based, counted across passes).
    pub fn fail_on_read(mut self, read: u64) -> Self {
        self.fail_on_read = Some(read);
        self
    }

    /// Returns the shared call counters.
    pub fn calls(&self) -> Arc<SourceCalls> {
        Arc::clone(&self.calls)
    }
}

impl RowIterator for ScriptedSource {
    fn init(&mut self) -> ExecResult<()> {
        self.calls.inits.fetch_add(1, Ordering::Relaxed);
        self.position = 0;
        self.record.set_null_row(false);
        Ok(())
    }

    fn read(&mut self) -> ExecResult<ReadStatus> {
        let reads = self.calls.reads.fetch_add(1, Ordering::Relaxed) + 1;
        if self.fail_on_read == Some(reads) {
            return Err(ExecError::source_failed(&self.name, "scripted failure"));
        }

        let Some(row) = self.rows.get(self.position) else {
            return Ok(ReadStatus::EndOfData);
        };
        self.position += 1;
        self.record.copy_from(row)?;
        Ok(ReadStatus::Row)
    }

    fn set_null_row_flag(&mut self, is_null_row: bool) {
        self.record.set_null_row(is_null_row);
    }

    fn unlock_row(&mut self) {
        self.calls.unlocks.fetch_add(1, Ordering::Relaxed);
    }

    fn start_batch_mode(&mut self) {
        self.calls.batch_starts.fetch_add(1, Ordering::Relaxed);
    }

    fn end_batch_mode_if_started(&mut self) {
        self.calls.batch_ends.fetch_add(1, Ordering::Relaxed);
    }
}

impl RowSource for ScriptedSource {
    fn record(&self) -> &RowBuffer {
        &self.record
    }

    fn record_mut(&mut self) -> &mut RowBuffer {
        &mut self.record
    }
}
