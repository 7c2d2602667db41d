//! Table definitions
//!
//! Column ids are positions in the table's column list: partition key
//! columns first, then clustering columns, then regular columns.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};
use crate::time::Ttl;

use super::{DataType, RowKey, Value};

/// Stable identifier of a column within one table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnId(u16);

impl ColumnId {
    pub const fn new(id: u16) -> Self {
        ColumnId(id)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Role of a column in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    PartitionKey,
    ClusteringKey,
    Regular,
}

impl ColumnKind {
    pub fn is_key(self) -> bool {
        !matches!(self, ColumnKind::Regular)
    }
}

/// A single column definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub id: ColumnId,
    pub name: String,
    pub data_type: DataType,
    pub kind: ColumnKind,
}

/// Schema of a wide-column table
#[derive(Debug, Clone)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnDef>,
    by_name: HashMap<String, ColumnId>,
    partition_key_len: usize,
    key_len: usize,
    default_ttl: Option<Ttl>,
}

impl TableSchema {
    /// Start defining a table
    pub fn builder(name: impl Into<String>) -> TableSchemaBuilder {
        TableSchemaBuilder {
            name: name.into(),
            partition: Vec::new(),
            clustering: Vec::new(),
            regular: Vec::new(),
            default_ttl: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table-level `default_time_to_live`, applied when a write names no TTL
    pub fn default_ttl(&self) -> Option<Ttl> {
        self.default_ttl
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn key_columns(&self) -> &[ColumnDef] {
        &self.columns[..self.key_len]
    }

    pub fn partition_key_len(&self) -> usize {
        self.partition_key_len
    }

    pub fn regular_columns(&self) -> &[ColumnDef] {
        &self.columns[self.key_len..]
    }

    /// Look up a column by name
    pub fn column_id(&self, name: &str) -> Result<ColumnId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| AtlasError::UnknownColumn(format!("{}.{}", self.name, name)))
    }

    /// Look up a column by id
    pub fn column(&self, id: ColumnId) -> Result<&ColumnDef> {
        self.columns
            .get(id.index())
            .ok_or_else(|| AtlasError::UnknownColumn(format!("{}.{}", self.name, id)))
    }

    /// Check that a key has one component per key column, each of the right type
    pub fn validate_key(&self, key: &RowKey) -> Result<()> {
        if key.len() != self.key_len {
            return Err(AtlasError::invalid_write(format!(
                "row key {} has {} components, table {} expects {}",
                key,
                key.len(),
                self.name,
                self.key_len
            )));
        }

        for (def, part) in self.key_columns().iter().zip(key.components()) {
            if part.data_type() != def.data_type {
                return Err(AtlasError::invalid_write(format!(
                    "key column {} is {}, got {}",
                    def.name,
                    def.data_type,
                    part.data_type()
                )));
            }
        }

        Ok(())
    }

    /// Check that a value may be assigned to a regular column
    pub fn validate_assignment(&self, def: &ColumnDef, value: Option<&Value>) -> Result<()> {
        if def.kind.is_key() {
            return Err(AtlasError::invalid_write(format!(
                "primary key column {} cannot be assigned",
                def.name
            )));
        }

        match value {
            Some(v) if v.data_type() != def.data_type => Err(AtlasError::invalid_write(format!(
                "column {} is {}, got {}",
                def.name,
                def.data_type,
                v.data_type()
            ))),
            _ => Ok(()),
        }
    }
}

/// Builder for TableSchema
pub struct TableSchemaBuilder {
    name: String,
    partition: Vec<(String, DataType)>,
    clustering: Vec<(String, DataType)>,
    regular: Vec<(String, DataType)>,
    default_ttl: Option<Ttl>,
}

impl TableSchemaBuilder {
    /// Append a partition key column
    pub fn partition_key(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.partition.push((name.into(), data_type));
        self
    }

    /// Append a clustering key column
    pub fn clustering_key(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.clustering.push((name.into(), data_type));
        self
    }

    /// Append a regular column
    pub fn column(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.regular.push((name.into(), data_type));
        self
    }

    /// Set the table's default TTL
    pub fn default_ttl(mut self, ttl: Ttl) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn build(self) -> Result<TableSchema> {
        if self.partition.is_empty() {
            return Err(AtlasError::Config(format!(
                "table {} needs at least one partition key column",
                self.name
            )));
        }

        let partition_key_len = self.partition.len();
        let key_len = partition_key_len + self.clustering.len();

        let kinds = std::iter::repeat(ColumnKind::PartitionKey)
            .take(self.partition.len())
            .chain(std::iter::repeat(ColumnKind::ClusteringKey).take(self.clustering.len()))
            .chain(std::iter::repeat(ColumnKind::Regular).take(self.regular.len()));

        let specs = self
            .partition
            .into_iter()
            .chain(self.clustering)
            .chain(self.regular);

        let mut columns = Vec::new();
        let mut by_name = HashMap::new();

        for (index, ((name, data_type), kind)) in specs.zip(kinds).enumerate() {
            let id = u16::try_from(index)
                .map(ColumnId)
                .map_err(|_| AtlasError::Config(format!("table {} has too many columns", self.name)))?;

            if by_name.insert(name.clone(), id).is_some() {
                return Err(AtlasError::Config(format!(
                    "table {} defines column {} twice",
                    self.name, name
                )));
            }

            columns.push(ColumnDef {
                id,
                name,
                data_type,
                kind,
            });
        }

        Ok(TableSchema {
            name: self.name,
            columns,
            by_name,
            partition_key_len,
            key_len,
            default_ttl: self.default_ttl,
        })
    }
}
