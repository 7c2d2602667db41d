//! Write intent definitions
//!
//! The three parsed write shapes the engine accepts. Built with chained
//! setters, mirroring the CQL they come from:
//!
//! ```text
//! INSERT INTO t (k.., c1, c2) VALUES (.., 1, 2) USING TTL 5
//!   → RowInsert::new(key).value("c1", 1).value("c2", 2).ttl(5)
//! UPDATE t USING TTL 5 SET c1 = null WHERE ..
//!   → PartialUpdate::new(key).set_null("c1").ttl(5)
//! DELETE FROM t WHERE ..
//!   → RowDelete::new(key)
//! ```

use crate::schema::{RowKey, Value};
use crate::time::Timestamp;

/// One `column = value` pair; `None` is an explicit null
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: String,
    pub value: Option<Value>,
}

/// A parsed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteIntent {
    /// Full-row insert: writes a liveness marker plus the listed cells
    RowInsert(RowInsert),

    /// Update of individual columns; never touches the liveness marker
    PartialUpdate(PartialUpdate),

    /// Deletes the whole row
    RowDelete(RowDelete),
}

impl WriteIntent {
    pub fn key(&self) -> &RowKey {
        match self {
            WriteIntent::RowInsert(w) => &w.key,
            WriteIntent::PartialUpdate(w) => &w.key,
            WriteIntent::RowDelete(w) => &w.key,
        }
    }

    /// Caller-supplied write timestamp, if any
    pub fn timestamp(&self) -> Option<Timestamp> {
        match self {
            WriteIntent::RowInsert(w) => w.timestamp,
            WriteIntent::PartialUpdate(w) => w.timestamp,
            WriteIntent::RowDelete(w) => w.timestamp,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            WriteIntent::RowInsert(_) => "insert",
            WriteIntent::PartialUpdate(_) => "update",
            WriteIntent::RowDelete(_) => "delete",
        }
    }
}

/// `INSERT INTO .. VALUES .. [USING TTL n] [USING TIMESTAMP t]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowInsert {
    pub key: RowKey,
    pub values: Vec<Assignment>,
    /// TTL in seconds as written by the client (validated on translation)
    pub ttl: Option<i64>,
    pub timestamp: Option<Timestamp>,
}

impl RowInsert {
    pub fn new(key: RowKey) -> Self {
        Self {
            key,
            values: Vec::new(),
            ttl: None,
            timestamp: None,
        }
    }

    pub fn value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push(Assignment {
            column: column.into(),
            value: Some(value.into()),
        });
        self
    }

    pub fn null(mut self, column: impl Into<String>) -> Self {
        self.values.push(Assignment {
            column: column.into(),
            value: None,
        });
        self
    }

    pub fn ttl(mut self, secs: i64) -> Self {
        self.ttl = Some(secs);
        self
    }

    pub fn timestamp(mut self, at: Timestamp) -> Self {
        self.timestamp = Some(at);
        self
    }
}

/// `UPDATE .. [USING TTL n] SET c = v, .. WHERE ..`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialUpdate {
    pub key: RowKey,
    pub assignments: Vec<Assignment>,
    pub ttl: Option<i64>,
    pub timestamp: Option<Timestamp>,
}

impl PartialUpdate {
    pub fn new(key: RowKey) -> Self {
        Self {
            key,
            assignments: Vec::new(),
            ttl: None,
            timestamp: None,
        }
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assignments.push(Assignment {
            column: column.into(),
            value: Some(value.into()),
        });
        self
    }

    pub fn set_null(mut self, column: impl Into<String>) -> Self {
        self.assignments.push(Assignment {
            column: column.into(),
            value: None,
        });
        self
    }

    pub fn ttl(mut self, secs: i64) -> Self {
        self.ttl = Some(secs);
        self
    }

    pub fn timestamp(mut self, at: Timestamp) -> Self {
        self.timestamp = Some(at);
        self
    }
}

/// `DELETE FROM .. WHERE ..`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDelete {
    pub key: RowKey,
    pub timestamp: Option<Timestamp>,
}

impl RowDelete {
    pub fn new(key: RowKey) -> Self {
        Self {
            key,
            timestamp: None,
        }
    }

    pub fn timestamp(mut self, at: Timestamp) -> Self {
        self.timestamp = Some(at);
        self
    }
}

impl From<RowInsert> for WriteIntent {
    fn from(w: RowInsert) -> Self {
        WriteIntent::RowInsert(w)
    }
}

impl From<PartialUpdate> for WriteIntent {
    fn from(w: PartialUpdate) -> Self {
        WriteIntent::PartialUpdate(w)
    }
}

impl From<RowDelete> for WriteIntent {
    fn from(w: RowDelete) -> Self {
        WriteIntent::RowDelete(w)
    }
}
