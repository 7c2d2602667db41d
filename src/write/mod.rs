//! Write Processor Module
//!
//! Turns parsed writes into records.
//!
//! ## Translation
//! ```text
//! RowInsert     → Liveness(ts, ttl) + Cell(c, v | tombstone, ts, ttl) per column
//! PartialUpdate → Cell(c, v, ts, ttl) or Cell(c, tombstone, ts) per column
//! RowDelete     → RowTombstone(ts)
//! ```
//! All records of one write share one timestamp and one TTL.

mod intent;
mod processor;

pub use intent::{Assignment, PartialUpdate, RowDelete, RowInsert, WriteIntent};
pub use processor::{PreparedWrite, WriteProcessor};
