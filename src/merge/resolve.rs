//! Merge of a row history at a read time
//!
//! Pure: the same history, request and read time always give the same
//! answer. Nothing here reads a clock.

use crate::error::Result;
use crate::schema::{ColumnId, RowKey, TableSchema, Value};
use crate::store::{CellValue, Record, RecordHistory, RecordKind};
use crate::time::Timestamp;

use super::{ResolvedColumn, RowView};

/// Resolve one row
///
/// Returns `Ok(None)` when nothing in the history is live at `read_time`.
/// Fails with `UnknownColumn` if `requested` names a column outside the
/// schema, whether or not the row exists.
pub fn resolve(
    schema: &TableSchema,
    key: &RowKey,
    history: &RecordHistory,
    requested: &[ColumnId],
    read_time: Timestamp,
) -> Result<Option<RowView>> {
    let defs = requested
        .iter()
        .map(|&id| schema.column(id))
        .collect::<Result<Vec<_>>>()?;

    let tombstone = history.row_tombstone();

    let liveness_alive = history
        .liveness()
        .map_or(false, |marker| is_live(marker, tombstone, read_time));

    // Existence looks at every written column, not only the requested ones.
    let any_column_alive = history
        .current_cells()
        .any(|(_, cell)| live_value(cell, tombstone, read_time).is_some());

    tracing::trace!(
        row = %key,
        read_time = %read_time,
        liveness_alive,
        any_column_alive,
        "resolve"
    );

    if !liveness_alive && !any_column_alive {
        return Ok(None);
    }

    let columns = defs
        .into_iter()
        .map(|def| {
            if def.kind.is_key() {
                return ResolvedColumn {
                    id: def.id,
                    name: def.name.clone(),
                    value: key.component(def.id.index()).cloned(),
                    write_time: None,
                    ttl_remaining: None,
                };
            }

            let live = history
                .current_cell(def.id)
                .and_then(|cell| live_value(cell, tombstone, read_time).map(|v| (cell, v)));

            match live {
                Some((cell, value)) => ResolvedColumn {
                    id: def.id,
                    name: def.name.clone(),
                    value: Some(value.clone()),
                    write_time: Some(cell.write_time),
                    ttl_remaining: cell.expiry.and_then(|expiry| read_time.until(expiry)),
                },
                None => ResolvedColumn {
                    id: def.id,
                    name: def.name.clone(),
                    value: None,
                    write_time: None,
                    ttl_remaining: None,
                },
            }
        })
        .collect();

    Ok(Some(RowView::new(key.clone(), columns, liveness_alive, read_time)))
}

/// Newer than the row tombstone and not yet expired
fn is_live(record: &Record, tombstone: Option<Timestamp>, read_time: Timestamp) -> bool {
    !record.is_shadowed_by(tombstone) && !record.is_expired_at(read_time)
}

/// The value a current cell contributes at `read_time`, if any
fn live_value(cell: &Record, tombstone: Option<Timestamp>, read_time: Timestamp) -> Option<&Value> {
    if !is_live(cell, tombstone, read_time) {
        return None;
    }
    match &cell.kind {
        RecordKind::Cell {
            value: CellValue::Value(v),
            ..
        } => Some(v),
        _ => None,
    }
}
