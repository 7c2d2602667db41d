//! # AtlasRow
//!
//! The row merge engine of a wide-column store with:
//! - Per-cell write timestamps and TTLs (last write wins per column)
//! - Cell tombstones (null assignments) and row tombstones (deletes)
//! - Liveness markers written by `INSERT` only, so rows created by
//!   `UPDATE` vanish once all their columns are gone
//! - Lazy expiry: a TTL is a predicate on the read time, never a timer
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Query Layer (external)                        │
//! │        parsed INSERT / UPDATE / DELETE / SELECT              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Engine                                   │
//! │        (Single Writer per Row / Multi Reader)                │
//! └──────┬──────────────────────┬───────────────────────┬───────┘
//!        │ writes               │                       │ reads
//!        ▼                      ▼                       ▼
//! ┌─────────────┐      ┌─────────────┐          ┌─────────────┐
//! │   Write     │─────▶│  Cell Log   │          │   Merge     │
//! │  Processor  │      │  (Append)   │          │  (resolve)  │
//! └─────────────┘      └──────┬──────┘          └──────▲──────┘
//!                             ▼                        │
//!                      ┌─────────────┐                 │
//!                      │ Cell Store  │─────────────────┘
//!                      │ (histories) │
//!                      └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod time;
pub mod schema;
pub mod store;
pub mod wal;
pub mod write;
pub mod merge;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AtlasError, Result};
pub use config::Config;
pub use engine::Engine;
pub use merge::{ReadRequest, RowView};
pub use schema::{DataType, RowKey, TableSchema, Value};
pub use time::{ManualClock, SystemClock, TimeSource, Timestamp, Ttl};
pub use write::{PartialUpdate, RowDelete, RowInsert, WriteIntent};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of AtlasRow
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
