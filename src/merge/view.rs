//! Row View
//!
//! Read-only result of a merge, handed to the query layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::schema::{ColumnId, RowKey, Value};
use crate::time::Timestamp;

/// One requested column after merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedColumn {
    pub id: ColumnId,
    pub name: String,

    /// Live value, or None for null / tombstoned / expired / never written
    pub value: Option<Value>,

    /// `WRITETIME(col)`: write timestamp of the live cell
    pub write_time: Option<Timestamp>,

    /// `TTL(col)`: time left before the live cell expires
    pub ttl_remaining: Option<Duration>,
}

/// A row that exists at the read time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowView {
    key: RowKey,
    columns: Vec<ResolvedColumn>,
    liveness_alive: bool,
    read_time: Timestamp,
}

impl RowView {
    pub(crate) fn new(
        key: RowKey,
        columns: Vec<ResolvedColumn>,
        liveness_alive: bool,
        read_time: Timestamp,
    ) -> Self {
        Self {
            key,
            columns,
            liveness_alive,
            read_time,
        }
    }

    pub fn key(&self) -> &RowKey {
        &self.key
    }

    /// Requested columns, in request order
    pub fn columns(&self) -> &[ResolvedColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ResolvedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Value of a requested column (None if null or not requested)
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.column(name).and_then(|c| c.value.as_ref())
    }

    /// True if the column was requested and resolved to null
    pub fn is_null(&self, name: &str) -> bool {
        self.column(name).map_or(false, |c| c.value.is_none())
    }

    pub fn write_time(&self, name: &str) -> Option<Timestamp> {
        self.column(name).and_then(|c| c.write_time)
    }

    pub fn ttl_remaining(&self, name: &str) -> Option<Duration> {
        self.column(name).and_then(|c| c.ttl_remaining)
    }

    /// Whether the row's liveness marker alone would keep it visible
    pub fn liveness_alive(&self) -> bool {
        self.liveness_alive
    }

    pub fn read_time(&self) -> Timestamp {
        self.read_time
    }
}
