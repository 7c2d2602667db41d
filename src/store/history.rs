//! Per-row record history
//!
//! An arena of appended records plus one index per slot. Slots are
//! resolved by write timestamp; on equal timestamps the record appended
//! later wins.

use std::collections::BTreeMap;

use crate::error::{AtlasError, Result};
use crate::schema::ColumnId;
use crate::time::Timestamp;

use super::{Record, RecordKind};

/// All records ever appended to one row
#[derive(Debug, Clone, Default)]
pub struct RecordHistory {
    /// Arena, in append order: (sequence number, record)
    records: Vec<(u64, Record)>,

    /// Column → arena index of its current cell
    cells: BTreeMap<ColumnId, usize>,

    /// Arena index of the current liveness marker
    liveness: Option<usize>,

    /// Arena index of the newest row tombstone
    tombstone: Option<usize>,

    /// Approximate size in bytes
    size: usize,
}

impl RecordHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record carrying sequence number `seq`
    ///
    /// `seq` must be strictly greater than every sequence number already in
    /// the history; anything else means the writer lost its serialization
    /// guarantee and the history can no longer be trusted.
    pub fn append(&mut self, seq: u64, record: Record) -> Result<()> {
        check_seq(self.last_seq(), seq)?;
        self.push(seq, record);
        Ok(())
    }

    /// Append all records of one write, or none of them
    ///
    /// Every sequence number is checked before the first record lands.
    pub fn append_batch(&mut self, batch: Vec<(u64, Record)>) -> Result<()> {
        let mut last = self.last_seq();
        for (seq, _) in &batch {
            check_seq(last, *seq)?;
            last = Some(*seq);
        }

        for (seq, record) in batch {
            self.push(seq, record);
        }
        Ok(())
    }

    fn push(&mut self, seq: u64, record: Record) {
        let index = self.records.len();
        let write_time = record.write_time;
        self.size += record.size_hint();

        let slot = match &record.kind {
            RecordKind::Cell { column, .. } => self.cells.get(column).copied(),
            RecordKind::Liveness => self.liveness,
            RecordKind::RowTombstone => self.tombstone,
        };
        let wins = slot.map_or(true, |current| write_time >= self.records[current].1.write_time);

        if wins {
            match &record.kind {
                RecordKind::Cell { column, .. } => {
                    self.cells.insert(*column, index);
                }
                RecordKind::Liveness => self.liveness = Some(index),
                RecordKind::RowTombstone => self.tombstone = Some(index),
            }
        }

        self.records.push((seq, record));
    }

    /// Current cell for `column`, tombstones included
    pub fn current_cell(&self, column: ColumnId) -> Option<&Record> {
        self.cells.get(&column).map(|&i| &self.records[i].1)
    }

    /// Current cell of every column that has ever been written, ordered by column id
    pub fn current_cells(&self) -> impl Iterator<Item = (ColumnId, &Record)> + '_ {
        self.cells.iter().map(move |(&column, &i)| (column, &self.records[i].1))
    }

    /// Current liveness marker
    pub fn liveness(&self) -> Option<&Record> {
        self.liveness.map(|i| &self.records[i].1)
    }

    /// Timestamp of the newest row tombstone
    pub fn row_tombstone(&self) -> Option<Timestamp> {
        self.tombstone.map(|i| self.records[i].1.write_time)
    }

    /// Every record in append order, superseded ones included
    pub fn records(&self) -> impl Iterator<Item = (u64, &Record)> + '_ {
        self.records.iter().map(|(seq, record)| (*seq, record))
    }

    pub fn last_seq(&self) -> Option<u64> {
        self.records.last().map(|(seq, _)| *seq)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Approximate size in bytes
    pub fn size(&self) -> usize {
        self.size
    }
}

fn check_seq(last: Option<u64>, seq: u64) -> Result<()> {
    match last {
        Some(last) if seq <= last => Err(AtlasError::corruption(format!(
            "append sequence went from {} to {}",
            last, seq
        ))),
        _ => Ok(()),
    }
}
