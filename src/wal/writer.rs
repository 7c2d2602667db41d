//! WAL Writers
//!
//! Log sinks the engine hands every record to before applying it.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;

use crate::error::Result;
use crate::schema::RowKey;
use crate::store::Record;

use super::{CellLog, WalEntry};

/// Buffers encoded frames in memory until the persister drains them
pub struct MemoryLog {
    inner: Mutex<Inner>,
}

struct Inner {
    /// Encoded frames not yet drained
    buffer: BytesMut,

    /// LSN of the last appended entry (0 = none yet)
    last_lsn: u64,

    /// Entries appended since creation
    entry_count: u64,
}

impl MemoryLog {
    /// Create an empty log whose first LSN will be 1
    pub fn new() -> Self {
        Self::starting_after(0)
    }

    /// Create an empty log that continues numbering after `last_lsn`
    pub fn starting_after(last_lsn: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                buffer: BytesMut::new(),
                last_lsn,
                entry_count: 0,
            }),
        }
    }

    /// Copy of the frames buffered so far
    pub fn frames(&self) -> Bytes {
        Bytes::copy_from_slice(&self.inner.lock().buffer)
    }

    /// Take the buffered frames, leaving the buffer empty
    pub fn drain(&self) -> Bytes {
        self.inner.lock().buffer.split().freeze()
    }

    /// Number of entries appended since creation
    pub fn entry_count(&self) -> u64 {
        self.inner.lock().entry_count
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl CellLog for MemoryLog {
    fn append_batch(&self, row_key: &RowKey, records: &[Record]) -> Result<Vec<u64>> {
        let mut inner = self.inner.lock();

        // Encode the whole batch before touching the buffer.
        let mut frames = Vec::with_capacity(records.len());
        let mut lsns = Vec::with_capacity(records.len());
        for (offset, record) in records.iter().enumerate() {
            let lsn = inner.last_lsn + 1 + offset as u64;
            frames.push(WalEntry::new(lsn, row_key.clone(), record.clone()).serialize()?);
            lsns.push(lsn);
        }

        let bytes: usize = frames.iter().map(Vec::len).sum();
        inner.buffer.reserve(bytes);
        for frame in &frames {
            inner.buffer.extend_from_slice(frame);
        }
        if let Some(&last) = lsns.last() {
            inner.last_lsn = last;
        }
        inner.entry_count += lsns.len() as u64;

        tracing::trace!(
            first_lsn = lsns.first().copied(),
            entries = lsns.len(),
            row = %row_key,
            bytes,
            "log append"
        );
        Ok(lsns)
    }

    fn last_lsn(&self) -> u64 {
        self.inner.lock().last_lsn
    }
}

/// Assigns sequence numbers and drops the records
#[derive(Debug, Default)]
pub struct NoopLog {
    last_lsn: AtomicU64,
}

impl NoopLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_after(last_lsn: u64) -> Self {
        Self {
            last_lsn: AtomicU64::new(last_lsn),
        }
    }
}

impl CellLog for NoopLog {
    fn append_batch(&self, _row_key: &RowKey, records: &[Record]) -> Result<Vec<u64>> {
        let count = records.len() as u64;
        let first = self.last_lsn.fetch_add(count, Ordering::SeqCst) + 1;
        Ok((first..first + count).collect())
    }

    fn last_lsn(&self) -> u64 {
        self.last_lsn.load(Ordering::SeqCst)
    }
}
