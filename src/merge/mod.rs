//! Merge Engine Module
//!
//! Reconciles a row's record history into the view visible at a read time.
//!
//! ## Algorithm
//! ```text
//! RT        = newest row tombstone timestamp, or -inf
//! live(r)   = r.write_time > RT  &&  (r.expiry is none || r.expiry > T)
//! liveness  = marker present && live(marker)
//! column(c) = current cell of c present && !tombstone && live(cell)
//! exists    = liveness || any column(c)
//! ```
//! A row that does not exist yields no view at all, even if its key was
//! written to. A row that exists always carries its full primary key.

mod resolve;
mod view;

pub use resolve::resolve;
pub use view::{ResolvedColumn, RowView};

use crate::schema::RowKey;
use crate::time::Timestamp;

/// A single-row read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub key: RowKey,

    /// Column names to return; None selects every column (key columns first)
    pub columns: Option<Vec<String>>,

    /// Read time; None reads at the engine clock's "now"
    pub read_time: Option<Timestamp>,
}

impl ReadRequest {
    /// `SELECT * ..`
    pub fn new(key: RowKey) -> Self {
        Self {
            key,
            columns: None,
            read_time: None,
        }
    }

    /// Restrict to the named columns, in this order
    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Read at a fixed time instead of "now"
    pub fn at(mut self, read_time: Timestamp) -> Self {
        self.read_time = Some(read_time);
        self
    }
}
