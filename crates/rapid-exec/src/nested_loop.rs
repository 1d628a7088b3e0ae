//! Nested-loop join with snapshot-cached inner scans.
//!
//! For every outer row the inner side is read from the start. Two paths
//! exist for that:
//!
//! - **cache path**: the inner relation's [`TableSnapshot`] is held for the
//!   whole execution and each inner pass walks it by index, copying rows into
//!   the inner source's record buffer
//! - **source path**: the inner source is re-initialized per outer row and
//!   read live
//!
//! The choice is made once in `init`. Join conditions are not evaluated
//! here; every inner row counts as a match and filtering happens above.
//!
//! # States
//!
//! ```text
//! Init -> ReadingFirstOuterRow -> ReadingFromCache  -+
//!                 ^                ReadingFromSource -+
//!                 +------------- next outer row ------+
//! ReadingFirstOuterRow -> EndOfOuterRows -> EndOfJoin
//! ```
//!
//! Any error moves the join to `EndOfJoin` and is returned to the caller.

use std::sync::Arc;

use rapid_cache::{SnapshotCache, TableSnapshot};
use rapid_common::JoinConfig;
use rapid_storage::RowBuffer;
use tracing::{debug, trace, warn};

use crate::error::{ExecError, ExecResult};
use crate::join_type::JoinType;
use crate::source::{ReadStatus, RowIterator, RowSource};
use crate::stats::JoinStats;

/// Execution state of a [`NestedLoopJoin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinState {
    /// Constructed, not yet initialized.
    Init,
    /// The next read starts by fetching an outer row.
    ReadingFirstOuterRow,
    /// Inner rows come from the snapshot.
    ReadingFromCache,
    /// Inner rows come from the live inner source.
    ReadingFromSource,
    /// The outer source is exhausted.
    EndOfOuterRows,
    /// Terminal. Reads return end of data.
    EndOfJoin,
}

/// Result of one state-machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// A joined row is ready in the children's buffers.
    Emit,
    /// Continue in the given state.
    Goto(JoinState),
    /// The join is over.
    Finished,
}

/// Nested-loop join over an outer and an inner row source.
///
/// The join owns both sources. After a read returns [`ReadStatus::Row`] the
/// joined row is the pair ([`outer_row`], [`inner_row`]); a null-extended
/// row has the inner record's null flag set.
///
/// [`outer_row`]: NestedLoopJoin::outer_row
/// [`inner_row`]: NestedLoopJoin::inner_row
#[derive(Debug)]
pub struct NestedLoopJoin {
    outer: Box<dyn RowSource>,
    inner: Box<dyn RowSource>,
    join_type: JoinType,
    config: JoinConfig,
    /// Cache to take inner snapshots from.
    cache: Option<Arc<SnapshotCache>>,
    /// Snapshot held for this execution.
    snapshot: Option<Arc<TableSnapshot>>,
    state: JoinState,
    /// Next snapshot row to read.
    cursor: usize,
    /// Whether the current outer row produced an output row.
    outer_row_matched: bool,
    stats: JoinStats,
}

impl NestedLoopJoin {
    /// Creates a join without a snapshot cache.
    pub fn new(outer: Box<dyn RowSource>, inner: Box<dyn RowSource>, join_type: JoinType) -> Self {
        Self {
            outer,
            inner,
            join_type,
            config: JoinConfig::default(),
            cache: None,
            snapshot: None,
            state: JoinState::Init,
            cursor: 0,
            outer_row_matched: false,
            stats: JoinStats::default(),
        }
    }

    /// Lets `init` take the inner snapshot from `cache`.
    pub fn with_cache(mut self, cache: Arc<SnapshotCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the join configuration.
    pub fn with_config(mut self, config: JoinConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the join kind.
    #[inline]
    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    /// Returns the current state.
    #[inline]
    pub fn state(&self) -> JoinState {
        self.state
    }

    /// Returns the counters.
    #[inline]
    pub fn stats(&self) -> JoinStats {
        self.stats
    }

    /// Returns true if inner passes are served from a snapshot.
    #[inline]
    pub fn uses_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Returns the held snapshot, if any.
    pub fn snapshot(&self) -> Option<&Arc<TableSnapshot>> {
        self.snapshot.as_ref()
    }

    /// Returns the outer side of the current row.
    pub fn outer_row(&self) -> &RowBuffer {
        self.outer.record()
    }

    /// Returns the inner side of the current row. Null-flagged when null-extended.
    pub fn inner_row(&self) -> &RowBuffer {
        self.inner.record()
    }

    /// Takes a snapshot of the inner relation if it is a caching candidate.
    fn acquire_snapshot(&self) -> Option<Arc<TableSnapshot>> {
        if !self.config.use_snapshot_cache {
            return None;
        }
        let cache = self.cache.as_ref()?;
        let relation = self.inner.relation()?;
        let descriptor = relation.descriptor();
        if !cache.should_cache(&descriptor) {
            debug!(
                relation = %descriptor.key(),
                estimated_rows = descriptor.estimated_rows(),
                "inner relation not cached"
            );
            return None;
        }

        let key = descriptor.key();
        let snapshot = cache.load_or_build(key, relation.as_ref())?;

        // The cache trusts the key it is given, so another caller may have
        // stored a different relation under it.
        let row_length = self.inner.record().len();
        if snapshot.row_length() != row_length || snapshot.descriptor().key() != key {
            warn!(
                relation = %key,
                snapshot_relation = %snapshot.descriptor().key(),
                snapshot_row_length = snapshot.row_length(),
                row_length,
                "snapshot incompatible with inner source, reading live"
            );
            return None;
        }
        Some(snapshot)
    }

    /// Fetches the next outer row and positions the inner side at its start.
    fn advance_outer(&mut self) -> ExecResult<Step> {
        if self.outer.read()? == ReadStatus::EndOfData {
            return Ok(Step::Goto(JoinState::EndOfOuterRows));
        }

        self.stats.outer_rows_scanned += 1;
        self.outer_row_matched = false;
        self.cursor = 0;

        if self.snapshot.is_some() {
            Ok(Step::Goto(JoinState::ReadingFromCache))
        } else {
            self.inner.init()?;
            if self.config.batch_mode {
                self.inner.start_batch_mode();
            }
            Ok(Step::Goto(JoinState::ReadingFromSource))
        }
    }

    /// Handles the end of an inner pass for the current outer row.
    fn inner_exhausted(&mut self) -> ExecResult<Step> {
        if self.config.batch_mode {
            self.inner.end_batch_mode_if_started();
        }

        if self.join_type.is_outer() && !self.outer_row_matched {
            self.inner.set_null_row_flag(true);
            self.outer_row_matched = true;
            return Ok(Step::Emit);
        }
        self.advance_outer()
    }

    fn read_from_cache(&mut self) -> ExecResult<Step> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return Ok(Step::Goto(JoinState::ReadingFromSource));
        };
        let Some(row) = snapshot.get_row(self.cursor) else {
            return self.inner_exhausted();
        };

        let record = self.inner.record_mut();
        if row.len() != record.len() {
            return Err(ExecError::RowLength {
                expected: record.len(),
                actual: row.len(),
            });
        }
        record.as_mut_slice().copy_from_slice(row);
        record.set_null_row(false);

        self.cursor += 1;
        self.stats.cache_hits += 1;
        self.outer_row_matched = true;
        Ok(Step::Emit)
    }

    fn read_from_source(&mut self) -> ExecResult<Step> {
        match self.inner.read()? {
            ReadStatus::Row => {
                self.inner.set_null_row_flag(false);
                self.stats.inner_rows_scanned += 1;
                self.outer_row_matched = true;
                Ok(Step::Emit)
            }
            ReadStatus::EndOfData => self.inner_exhausted(),
        }
    }

    fn step(&mut self) -> ExecResult<Step> {
        match self.state {
            JoinState::Init => Err(ExecError::NotInitialized("nested-loop join")),
            JoinState::ReadingFirstOuterRow => self.advance_outer(),
            JoinState::ReadingFromCache => self.read_from_cache(),
            JoinState::ReadingFromSource => self.read_from_source(),
            JoinState::EndOfOuterRows => {
                debug!(
                    join_type = %self.join_type,
                    outer_rows = self.stats.outer_rows_scanned,
                    inner_rows = self.stats.inner_rows_scanned,
                    cache_hits = self.stats.cache_hits,
                    "nested-loop join finished"
                );
                Ok(Step::Goto(JoinState::EndOfJoin))
            }
            JoinState::EndOfJoin => Ok(Step::Finished),
        }
    }
}

impl RowIterator for NestedLoopJoin {
    fn init(&mut self) -> ExecResult<()> {
        self.state = JoinState::Init;
        self.snapshot = None;
        self.outer.init()?;
        self.inner.init()?;

        self.cursor = 0;
        self.outer_row_matched = false;
        self.stats = JoinStats::default();
        self.snapshot = self.acquire_snapshot();
        self.state = JoinState::ReadingFirstOuterRow;

        debug!(
            join_type = %self.join_type,
            cached = self.snapshot.is_some(),
            "nested-loop join initialized"
        );
        Ok(())
    }

    fn read(&mut self) -> ExecResult<ReadStatus> {
        loop {
            match self.step() {
                Ok(Step::Emit) => return Ok(ReadStatus::Row),
                Ok(Step::Goto(next)) => {
                    trace!(from = ?self.state, to = ?next, "join state transition");
                    self.state = next;
                }
                Ok(Step::Finished) => return Ok(ReadStatus::EndOfData),
                Err(err) => {
                    if self.state != JoinState::Init {
                        self.state = JoinState::EndOfJoin;
                    }
                    return Err(err);
                }
            }
        }
    }

    fn set_null_row_flag(&mut self, is_null_row: bool) {
        self.outer.set_null_row_flag(is_null_row);
        self.inner.set_null_row_flag(is_null_row);
    }

    fn unlock_row(&mut self) {
        self.outer.unlock_row();
        self.inner.unlock_row();
    }

    fn start_batch_mode(&mut self) {
        self.outer.start_batch_mode();
        self.inner.start_batch_mode();
    }

    fn end_batch_mode_if_started(&mut self) {
        self.outer.end_batch_mode_if_started();
        self.inner.end_batch_mode_if_started();
    }
}
