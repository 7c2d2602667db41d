//! Cell Store Module
//!
//! Append-only record histories, one per row.
//!
//! ## Responsibilities
//! - Keep every record ever written to a row, in append order
//! - Index the current record of each slot (per column, liveness, row tombstone)
//! - Reject appends whose sequence number does not advance
//!
//! ## Record Kinds
//! ```text
//! ┌──────────────┬───────────────┬──────────────────────────────┐
//! │ Kind         │ Written by    │ Shadows                      │
//! ├──────────────┼───────────────┼──────────────────────────────┤
//! │ Cell         │ insert/update │ older cells of same column   │
//! │ Liveness     │ insert only   │ older liveness markers       │
//! │ RowTombstone │ delete        │ everything with ts <= its ts │
//! └──────────────┴───────────────┴──────────────────────────────┘
//! ```

mod cell_store;
mod history;

pub use cell_store::CellStore;
pub use history::RecordHistory;

use serde::{Deserialize, Serialize};

use crate::schema::{ColumnId, Value};
use crate::time::Timestamp;

/// Content of a cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    /// A live value
    Value(Value),

    /// A tombstone (null assignment)
    Tombstone,
}

impl CellValue {
    pub fn is_tombstone(&self) -> bool {
        matches!(self, CellValue::Tombstone)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            CellValue::Value(v) => Some(v),
            CellValue::Tombstone => None,
        }
    }
}

impl From<Option<Value>> for CellValue {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(v) => CellValue::Value(v),
            None => CellValue::Tombstone,
        }
    }
}

/// What a record writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// A single column's value or tombstone
    Cell { column: ColumnId, value: CellValue },

    /// Row presence marker written by inserts
    Liveness,

    /// Deletes the whole row up to and including `write_time`
    RowTombstone,
}

/// A single timestamped record in a row's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub kind: RecordKind,

    /// Write timestamp (last write wins per slot)
    pub write_time: Timestamp,

    /// First instant at which the record is no longer live; None = never
    pub expiry: Option<Timestamp>,
}

impl Record {
    pub fn cell(column: ColumnId, value: CellValue, write_time: Timestamp, expiry: Option<Timestamp>) -> Self {
        // Tombstones never carry an expiry: they are dead from the moment they are written.
        let expiry = if value.is_tombstone() { None } else { expiry };
        Self {
            kind: RecordKind::Cell { column, value },
            write_time,
            expiry,
        }
    }

    pub fn liveness(write_time: Timestamp, expiry: Option<Timestamp>) -> Self {
        Self {
            kind: RecordKind::Liveness,
            write_time,
            expiry,
        }
    }

    pub fn row_tombstone(write_time: Timestamp) -> Self {
        Self {
            kind: RecordKind::RowTombstone,
            write_time,
            expiry: None,
        }
    }

    /// True once `read_time` has reached the record's expiry
    pub fn is_expired_at(&self, read_time: Timestamp) -> bool {
        self.expiry.map_or(false, |expiry| expiry <= read_time)
    }

    /// True if a row tombstone at `tombstone` deletes this record
    pub fn is_shadowed_by(&self, tombstone: Option<Timestamp>) -> bool {
        tombstone.map_or(false, |rt| self.write_time <= rt)
    }

    /// Approximate in-memory footprint
    pub fn size_hint(&self) -> usize {
        let payload = match &self.kind {
            RecordKind::Cell {
                value: CellValue::Value(v),
                ..
            } => v.size_hint(),
            _ => 0,
        };
        std::mem::size_of::<Record>() + payload
    }
}
