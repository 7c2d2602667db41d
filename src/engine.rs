//! Engine Module
//!
//! The table-level engine that coordinates all components.
//!
//! ## Responsibilities
//! - Stamp writes with the clock and translate them into records
//! - Hand every record to the cell log, then append it to the row history
//! - Serve reads by merging a row's history at a read time
//! - Rebuild the store from replayed log frames

use std::sync::Arc;

use crate::config::Config;
use crate::error::{AtlasError, Result};
use crate::merge::{resolve, ReadRequest, RowView};
use crate::schema::{ColumnId, RowKey, TableSchema};
use crate::store::{CellStore, Record, RecordHistory, RecordKind};
use crate::time::{SystemClock, TimeSource, Timestamp};
use crate::wal::{CellLog, MemoryLog, NoopLog, RecoveryResult, WalRecovery};
use crate::write::{PartialUpdate, RowDelete, RowInsert, WriteIntent, WriteProcessor};

/// The engine for one table
///
/// ## Concurrency Model: Single Writer per Row / Multiple Readers
///
/// - **Writes**: hold the target row's write lock while logging and
///   appending, so one row never has two writers at once. Writers of
///   different rows proceed in parallel; the log serializes LSN assignment.
///
/// - **Reads**: take the row's read lock only for the duration of the merge.
///   The merge itself is a pure function of the history and the read time.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Table layout
    schema: Arc<TableSchema>,

    /// Source of "now" for writes and reads without an explicit time
    clock: Arc<dyn TimeSource>,

    /// Append-only sink every record goes through first
    log: Arc<dyn CellLog>,

    /// Row histories
    store: CellStore,
}

impl Engine {
    /// Create an engine on the system clock with no log sink
    pub fn new(schema: TableSchema, config: Config) -> Self {
        Self::with_parts(
            schema,
            config,
            Arc::new(SystemClock::new()),
            Arc::new(NoopLog::new()),
        )
    }

    /// Create an engine from explicit collaborators
    pub fn with_parts(
        schema: TableSchema,
        config: Config,
        clock: Arc<dyn TimeSource>,
        log: Arc<dyn CellLog>,
    ) -> Self {
        Self {
            config,
            schema: Arc::new(schema),
            clock,
            log,
            store: CellStore::new(),
        }
    }

    /// Rebuild an engine from persisted log frames
    ///
    /// On startup:
    /// 1. Replay the frames (CRC and LSN order checked)
    /// 2. Check every record against the schema
    /// 3. Append the records to their row histories
    /// 4. Continue numbering after the last recovered LSN
    pub fn recover(
        schema: TableSchema,
        config: Config,
        clock: Arc<dyn TimeSource>,
        frames: &[u8],
    ) -> Result<(Self, Arc<MemoryLog>, RecoveryResult)> {
        let (entries, result) = WalRecovery::replay(frames)?;

        let log = Arc::new(MemoryLog::starting_after(result.last_lsn));
        let engine = Self::with_parts(schema, config, clock, Arc::clone(&log) as Arc<dyn CellLog>);

        for entry in entries {
            engine.schema.validate_key(&entry.row_key).map_err(|e| {
                AtlasError::corruption(format!("log entry {} does not fit schema: {}", entry.lsn, e))
            })?;
            if let RecordKind::Cell { column, .. } = &entry.record.kind {
                let def = engine.schema.column(*column).map_err(|e| {
                    AtlasError::corruption(format!("log entry {} does not fit schema: {}", entry.lsn, e))
                })?;
                if def.kind.is_key() {
                    return Err(AtlasError::corruption(format!(
                        "log entry {} writes a cell to key column {}",
                        entry.lsn, def.name
                    )));
                }
            }
            engine.store.append(&entry.row_key, entry.lsn, entry.record)?;
        }

        if result.entries_recovered > 0 {
            tracing::info!(
                entries = result.entries_recovered,
                rows = engine.store.row_count(),
                last_lsn = result.last_lsn,
                "recovered table {} from log",
                engine.schema.name()
            );
        }

        Ok((engine, log, result))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Apply a write; returns the timestamp it was written at
    ///
    /// Steps:
    /// 1. Validate and translate (no state touched on failure)
    /// 2. Lock the row
    /// 3. Log the whole batch, then append it to the history
    ///
    /// A write is all or nothing: if logging fails, neither the log nor the
    /// history keeps any of its records.
    pub fn execute(&self, intent: impl Into<WriteIntent>) -> Result<Timestamp> {
        let intent = intent.into();
        let prepared = WriteProcessor::new(&self.schema, &self.config).translate(&intent, self.clock.now())?;

        let slot = self.store.row_or_create(&prepared.key);
        let mut history = slot.write();

        let applied = self.apply(&prepared.key, &mut history, prepared.records);
        if let Err(e) = applied {
            if history.is_empty() {
                self.store.discard_if_unused(&prepared.key, &slot);
            }
            tracing::debug!(kind = intent.kind_name(), row = %prepared.key, error = %e, "write rejected");
            return Err(e);
        }

        tracing::debug!(
            kind = intent.kind_name(),
            row = %prepared.key,
            write_time = %prepared.write_time,
            history_len = history.len(),
            "write applied"
        );

        Ok(prepared.write_time)
    }

    fn apply(&self, key: &RowKey, history: &mut RecordHistory, records: Vec<Record>) -> Result<()> {
        // LSNs only grow, so a history ahead of the log could never accept them.
        if let Some(last) = history.last_seq() {
            let logged = self.log.last_lsn();
            if last > logged {
                return Err(AtlasError::corruption(format!(
                    "row {} holds sequence {} but the log is at {}",
                    key, last, logged
                )));
            }
        }

        let lsns = self.log.append_batch(key, &records)?;
        if lsns.len() != records.len() {
            return Err(AtlasError::corruption(format!(
                "log assigned {} LSNs to {} records",
                lsns.len(),
                records.len()
            )));
        }

        self.store.append_locked(history, lsns.into_iter().zip(records).collect())
    }

    /// `INSERT`
    pub fn insert(&self, insert: RowInsert) -> Result<Timestamp> {
        self.execute(insert)
    }

    /// `UPDATE`
    pub fn update(&self, update: PartialUpdate) -> Result<Timestamp> {
        self.execute(update)
    }

    /// `DELETE`
    pub fn delete(&self, delete: RowDelete) -> Result<Timestamp> {
        self.execute(delete)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Resolve a read request
    pub fn read(&self, request: &ReadRequest) -> Result<Option<RowView>> {
        self.schema.validate_key(&request.key)?;
        let columns = self.requested_columns(request.columns.as_deref())?;
        let read_time = request.read_time.unwrap_or_else(|| self.clock.now());

        self.store
            .read(&request.key, |history| {
                resolve(&self.schema, &request.key, history, &columns, read_time)
            })
            .unwrap_or(Ok(None))
    }

    /// Read the named columns at the clock's current time
    pub fn get(&self, key: &RowKey, columns: &[&str]) -> Result<Option<RowView>> {
        self.read(&ReadRequest::new(key.clone()).columns(columns.iter().copied()))
    }

    /// Read the named columns at a fixed time
    pub fn get_at(&self, key: &RowKey, columns: &[&str], read_time: Timestamp) -> Result<Option<RowView>> {
        self.read(
            &ReadRequest::new(key.clone())
                .columns(columns.iter().copied())
                .at(read_time),
        )
    }

    fn requested_columns(&self, names: Option<&[String]>) -> Result<Vec<ColumnId>> {
        match names {
            Some(names) => names.iter().map(|name| self.schema.column_id(name)).collect(),
            None => Ok(self.schema.columns().iter().map(|def| def.id).collect()),
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Clone of a row's full history
    pub fn history(&self, key: &RowKey) -> Option<RecordHistory> {
        self.store.snapshot(key)
    }

    /// Number of rows ever written (live or not)
    pub fn row_count(&self) -> usize {
        self.store.row_count()
    }

    /// Total records appended
    pub fn record_count(&self) -> usize {
        self.store.record_count()
    }

    /// LSN of the most recent logged record
    pub fn last_lsn(&self) -> u64 {
        self.log.last_lsn()
    }

    /// Current time according to the engine clock
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
