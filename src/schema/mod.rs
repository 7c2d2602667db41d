//! Schema Module
//!
//! Table layout the engine validates writes and reads against.
//!
//! ## Responsibilities
//! - Column ids, names, types and roles (partition / clustering / regular)
//! - Row key arity and type checks
//! - Table-level default TTL
//!
//! ## Example
//! ```text
//! CREATE TABLE t (k1 int, k2 int, k3 int, k4 int, c1 int, c2 int, c3 int,
//!                 PRIMARY KEY ((k1, k2), k3, k4))
//!
//!   id:   0    1    2    3    4    5    6
//!        k1   k2 | k3   k4 | c1   c2   c3
//!        partition clustering  regular
//! ```

mod key;
mod table;
mod value;

pub use key::RowKey;
pub use table::{ColumnDef, ColumnId, ColumnKind, TableSchema, TableSchemaBuilder};
pub use value::{DataType, Value};
