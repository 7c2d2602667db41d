//! Write-Ahead Log (WAL) Module
//!
//! Every record is handed to a `CellLog` before it reaches the cell store.
//! The engine never persists the log itself: `MemoryLog` buffers encoded
//! frames for an external persister, and `WalRecovery` rebuilds entries
//! from whatever that persister hands back.
//!
//! ## Responsibilities
//! - Assign Log Sequence Numbers (LSN), strictly increasing
//! - CRC32 checksums for corruption detection
//! - Replay with torn-tail handling
//!
//! ## Frame Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Entry 1                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Entry 2                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//! Data is the bincode encoding of `(RowKey, Record)`.

mod entry;
mod reader;
mod recovery;
mod writer;

pub use entry::{WalEntry, HEADER_SIZE, MAX_PAYLOAD_SIZE};
pub use reader::{WalIterator, WalReader};
pub use recovery::{RecoveryResult, WalRecovery};
pub use writer::{MemoryLog, NoopLog};

use crate::error::{AtlasError, Result};
use crate::schema::RowKey;
use crate::store::Record;

/// Append-only sink for records
pub trait CellLog: Send + Sync {
    /// Log all records of one write and return their LSNs, in order
    ///
    /// All or nothing: on error no record of the batch is logged and no
    /// LSN is consumed.
    fn append_batch(&self, row_key: &RowKey, records: &[Record]) -> Result<Vec<u64>>;

    /// Log a single record and return the LSN assigned to it
    fn append(&self, row_key: &RowKey, record: &Record) -> Result<u64> {
        let lsns = self.append_batch(row_key, std::slice::from_ref(record))?;
        lsns.first()
            .copied()
            .ok_or_else(|| AtlasError::corruption("log assigned no LSN to a single record"))
    }

    /// LSN of the most recent append (0 if none)
    fn last_lsn(&self) -> u64;
}
