//! Cell Store implementation
//!
//! BTreeMap of row histories. Each history sits behind its own lock so
//! writers of different rows never wait on each other.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::schema::RowKey;

use super::{Record, RecordHistory};

/// Shared handle to one row's history
pub type RowSlot = Arc<RwLock<RecordHistory>>;

/// All row histories of one table
///
/// ## Concurrency:
/// - `rows`: outer RwLock held only to find or create a row
/// - each `RecordHistory`: its own RwLock, write-locked by the single writer
///   of that row, read-locked by readers for the duration of one merge
/// - `record_count`: atomic, lock-free
pub struct CellStore {
    rows: RwLock<BTreeMap<RowKey, RowSlot>>,
    record_count: AtomicUsize,
}

impl CellStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            record_count: AtomicUsize::new(0),
        }
    }

    /// Handle to an existing row
    pub fn row(&self, key: &RowKey) -> Option<RowSlot> {
        self.rows.read().get(key).cloned()
    }

    /// Handle to a row, creating an empty history on first write
    pub fn row_or_create(&self, key: &RowKey) -> RowSlot {
        if let Some(slot) = self.row(key) {
            return slot;
        }
        let mut rows = self.rows.write();
        Arc::clone(rows.entry(key.clone()).or_default())
    }

    /// Append a single record to a row (write lock on that row only)
    pub fn append(&self, key: &RowKey, seq: u64, record: Record) -> Result<()> {
        let slot = self.row_or_create(key);
        let mut history = slot.write();
        self.append_locked(&mut history, vec![(seq, record)])
    }

    /// Append one write's records to a history the caller already holds
    /// the write lock of (all or nothing)
    pub fn append_locked(&self, history: &mut RecordHistory, batch: Vec<(u64, Record)>) -> Result<()> {
        let count = batch.len();
        history.append_batch(batch)?;
        self.record_count.fetch_add(count, Ordering::Relaxed);
        Ok(())
    }

    /// Drop a row entry that a rejected first write created
    ///
    /// Only removed while the caller's handle and the map's are the only
    /// ones; a concurrent writer or reader holding the slot keeps it alive.
    pub fn discard_if_unused(&self, key: &RowKey, slot: &RowSlot) {
        let mut rows = self.rows.write();
        let unused = rows
            .get(key)
            .map_or(false, |current| Arc::ptr_eq(current, slot) && Arc::strong_count(slot) == 2);
        if unused {
            rows.remove(key);
        }
    }

    /// Run `f` against a row's history under its read lock
    pub fn read<R>(&self, key: &RowKey, f: impl FnOnce(&RecordHistory) -> R) -> Option<R> {
        let slot = self.row(key)?;
        let history = slot.read();
        Some(f(&history))
    }

    /// Clone a row's history
    pub fn snapshot(&self, key: &RowKey) -> Option<RecordHistory> {
        self.read(key, RecordHistory::clone)
    }

    /// Keys of every row ever written, in key order
    pub fn keys(&self) -> Vec<RowKey> {
        self.rows.read().keys().cloned().collect()
    }

    /// Number of rows with a history (live or not)
    pub fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    /// Total number of records appended
    pub fn record_count(&self) -> usize {
        self.record_count.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

impl Default for CellStore {
    fn default() -> Self {
        Self::new()
    }
}
