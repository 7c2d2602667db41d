//! Write Processor
//!
//! Validates a `WriteIntent` against the schema and config and turns it
//! into the records to append. Never looks at existing history.

use std::collections::HashSet;

use crate::config::Config;
use crate::error::{AtlasError, Result};
use crate::schema::{RowKey, TableSchema};
use crate::store::{CellValue, Record};
use crate::time::{Timestamp, Ttl};

use super::{Assignment, PartialUpdate, RowDelete, RowInsert, WriteIntent};

/// Records produced by one write, all for the same row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedWrite {
    pub key: RowKey,
    pub write_time: Timestamp,
    pub records: Vec<Record>,
}

/// Translates write intents into records
pub struct WriteProcessor<'a> {
    schema: &'a TableSchema,
    config: &'a Config,
}

impl<'a> WriteProcessor<'a> {
    pub fn new(schema: &'a TableSchema, config: &'a Config) -> Self {
        Self { schema, config }
    }

    /// Translate `intent`, stamping it with `now` unless it carries its own timestamp
    pub fn translate(&self, intent: &WriteIntent, now: Timestamp) -> Result<PreparedWrite> {
        self.schema.validate_key(intent.key())?;
        let write_time = intent.timestamp().unwrap_or(now);

        let records = match intent {
            WriteIntent::RowInsert(insert) => self.translate_insert(insert, write_time)?,
            WriteIntent::PartialUpdate(update) => self.translate_update(update, write_time)?,
            WriteIntent::RowDelete(delete) => self.translate_delete(delete, write_time),
        };

        Ok(PreparedWrite {
            key: intent.key().clone(),
            write_time,
            records,
        })
    }

    /// Liveness marker first, then one cell per listed column, all sharing
    /// the write time and expiry
    fn translate_insert(&self, insert: &RowInsert, write_time: Timestamp) -> Result<Vec<Record>> {
        let expiry = self.expiry(insert.ttl, write_time)?;

        let mut records = Vec::with_capacity(insert.values.len() + 1);
        records.push(Record::liveness(write_time, expiry));
        records.extend(self.cells(&insert.values, write_time, expiry)?);
        Ok(records)
    }

    fn translate_update(&self, update: &PartialUpdate, write_time: Timestamp) -> Result<Vec<Record>> {
        if update.assignments.is_empty() {
            return Err(AtlasError::invalid_write(format!(
                "update of {} assigns no columns",
                update.key
            )));
        }

        if update.ttl.is_some() && self.config.reject_null_ttl {
            if let Some(null) = update.assignments.iter().find(|a| a.value.is_none()) {
                return Err(AtlasError::invalid_write(format!(
                    "TTL given for null assignment to column {}",
                    null.column
                )));
            }
        }

        let expiry = self.expiry(update.ttl, write_time)?;
        self.cells(&update.assignments, write_time, expiry)
    }

    fn translate_delete(&self, _delete: &RowDelete, write_time: Timestamp) -> Vec<Record> {
        vec![Record::row_tombstone(write_time)]
    }

    /// One cell per assignment; nulls become tombstones (expiry dropped)
    fn cells(
        &self,
        assignments: &[Assignment],
        write_time: Timestamp,
        expiry: Option<Timestamp>,
    ) -> Result<Vec<Record>> {
        let mut seen = HashSet::with_capacity(assignments.len());
        let mut records = Vec::with_capacity(assignments.len());

        for assignment in assignments {
            let id = self.schema.column_id(&assignment.column)?;
            let def = self.schema.column(id)?;
            self.schema.validate_assignment(def, assignment.value.as_ref())?;

            if !seen.insert(id) {
                return Err(AtlasError::invalid_write(format!(
                    "column {} assigned more than once",
                    def.name
                )));
            }

            let value = CellValue::from(assignment.value.clone());
            records.push(Record::cell(id, value, write_time, expiry));
        }

        Ok(records)
    }

    /// Expiry for a write: explicit TTL, else the table default, else never
    fn expiry(&self, ttl: Option<i64>, write_time: Timestamp) -> Result<Option<Timestamp>> {
        let ttl = match ttl {
            Some(secs) => Some(self.validate_ttl(secs)?),
            None => self.schema.default_ttl(),
        };
        Ok(ttl.map(|ttl| write_time.expiry_after(ttl)))
    }

    fn validate_ttl(&self, secs: i64) -> Result<Ttl> {
        let ttl = Ttl::from_secs(secs)?;
        if ttl > self.config.max_ttl {
            return Err(AtlasError::invalid_write(format!(
                "TTL {} exceeds maximum {}",
                ttl, self.config.max_ttl
            )));
        }
        Ok(ttl)
    }
}
