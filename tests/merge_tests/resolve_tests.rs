//! Tests for the merge engine
//!
//! These tests verify `resolve` directly against hand-built histories:
//! - Liveness marker vs. column-driven existence
//! - Row tombstone shadowing, including equal timestamps
//! - Last-appended-wins tie-break within a slot
//! - Expiry boundaries
//! - Unknown column handling

use atlasrow::merge::resolve;
use atlasrow::schema::ColumnId;
use atlasrow::store::{CellValue, Record, RecordHistory};
use atlasrow::{AtlasError, DataType, RowKey, TableSchema, Timestamp, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn schema() -> TableSchema {
    TableSchema::builder("t")
        .partition_key("k", DataType::Int)
        .column("a", DataType::Int)
        .column("b", DataType::Int)
        .build()
        .unwrap()
}

fn ts(secs: i64) -> Timestamp {
    Timestamp::from_secs(secs)
}

const K: ColumnId = ColumnId::new(0);
const A: ColumnId = ColumnId::new(1);
const B: ColumnId = ColumnId::new(2);

fn cell(column: ColumnId, value: i32, at: i64, expires: Option<i64>) -> Record {
    Record::cell(column, CellValue::Value(Value::Int(value)), ts(at), expires.map(ts))
}

fn null_cell(column: ColumnId, at: i64) -> Record {
    Record::cell(column, CellValue::Tombstone, ts(at), None)
}

/// Build a history appending records with sequence numbers 1, 2, 3, ...
fn history(records: Vec<Record>) -> RecordHistory {
    let mut history = RecordHistory::new();
    for (i, record) in records.into_iter().enumerate() {
        history.append(i as u64 + 1, record).unwrap();
    }
    history
}

fn row_key() -> RowKey {
    RowKey::new([7])
}

// =============================================================================
// Existence Tests
// =============================================================================

#[test]
fn test_empty_history_has_no_row() {
    let result = resolve(&schema(), &row_key(), &RecordHistory::new(), &[A], ts(0)).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_liveness_alone_makes_row_exist() {
    let h = history(vec![Record::liveness(ts(0), None)]);

    let row = resolve(&schema(), &row_key(), &h, &[K, A, B], ts(100)).unwrap().unwrap();

    assert_eq!(row.value("k"), Some(&Value::Int(7)));
    assert!(row.is_null("a"));
    assert!(row.is_null("b"));
    assert!(row.liveness_alive());
}

#[test]
fn test_unrequested_live_column_keeps_row() {
    let h = history(vec![cell(B, 2, 0, None)]);

    let row = resolve(&schema(), &row_key(), &h, &[A], ts(1)).unwrap().unwrap();

    assert!(row.is_null("a"));
    assert!(row.column("b").is_none(), "b was not requested");
}

#[test]
fn test_only_tombstoned_columns_means_no_row() {
    let h = history(vec![cell(A, 1, 0, None), null_cell(A, 1), null_cell(B, 1)]);

    assert!(resolve(&schema(), &row_key(), &h, &[A, B], ts(2)).unwrap().is_none());
}

#[test]
fn test_key_only_request_still_checks_existence() {
    let h = history(vec![cell(A, 1, 0, Some(1))]);

    assert!(resolve(&schema(), &row_key(), &h, &[K], ts(0)).unwrap().is_some());
    assert!(resolve(&schema(), &row_key(), &h, &[K], ts(1)).unwrap().is_none());
}

// =============================================================================
// Expiry Tests
// =============================================================================

#[test]
fn test_expiry_is_exclusive_at_boundary() {
    let h = history(vec![Record::liveness(ts(0), Some(ts(2)))]);

    let just_before = Timestamp::from_micros(ts(2).as_micros() - 1);
    assert!(resolve(&schema(), &row_key(), &h, &[A], just_before).unwrap().is_some());
    assert!(resolve(&schema(), &row_key(), &h, &[A], ts(2)).unwrap().is_none());
}

#[test]
fn test_expired_liveness_with_live_column() {
    let h = history(vec![
        Record::liveness(ts(0), Some(ts(1))),
        cell(A, 1, 0, Some(1)),
        cell(B, 2, 0, None),
    ]);

    let row = resolve(&schema(), &row_key(), &h, &[A, B], ts(5)).unwrap().unwrap();

    assert!(!row.liveness_alive());
    assert!(row.is_null("a"));
    assert_eq!(row.value("b"), Some(&Value::Int(2)));
}

// =============================================================================
// Row Tombstone Tests
// =============================================================================

#[test]
fn test_row_tombstone_shadows_older_records() {
    let h = history(vec![
        Record::liveness(ts(0), None),
        cell(A, 1, 0, None),
        Record::row_tombstone(ts(5)),
    ]);

    assert!(resolve(&schema(), &row_key(), &h, &[A], ts(6)).unwrap().is_none());
}

#[test]
fn test_row_tombstone_wins_timestamp_tie() {
    let h = history(vec![Record::row_tombstone(ts(5)), Record::liveness(ts(5), None), cell(A, 1, 5, None)]);

    assert!(resolve(&schema(), &row_key(), &h, &[A], ts(6)).unwrap().is_none());
}

#[test]
fn test_newest_row_tombstone_counts() {
    let h = history(vec![
        Record::row_tombstone(ts(10)),
        Record::row_tombstone(ts(3)),
        cell(A, 1, 5, None),
    ]);

    assert_eq!(h.row_tombstone(), Some(ts(10)));
    assert!(resolve(&schema(), &row_key(), &h, &[A], ts(11)).unwrap().is_none());
}

#[test]
fn test_write_after_tombstone_survives() {
    let h = history(vec![
        cell(A, 1, 0, None),
        cell(B, 2, 0, None),
        Record::row_tombstone(ts(5)),
        cell(A, 3, 6, None),
    ]);

    let row = resolve(&schema(), &row_key(), &h, &[A, B], ts(7)).unwrap().unwrap();

    assert_eq!(row.value("a"), Some(&Value::Int(3)));
    assert!(row.is_null("b"));
    assert!(!row.liveness_alive());
}

// =============================================================================
// Tie-Break Tests
// =============================================================================

#[test]
fn test_equal_timestamp_last_appended_wins() {
    let h = history(vec![cell(A, 1, 0, Some(2)), cell(A, 100, 0, Some(1))]);

    let row = resolve(&schema(), &row_key(), &h, &[A], ts(0)).unwrap().unwrap();
    assert_eq!(row.value("a"), Some(&Value::Int(100)));

    assert!(resolve(&schema(), &row_key(), &h, &[A], ts(1)).unwrap().is_none());
}

#[test]
fn test_older_timestamp_appended_later_loses() {
    let h = history(vec![cell(A, 2, 10, None), cell(A, 1, 5, None)]);

    let row = resolve(&schema(), &row_key(), &h, &[A], ts(11)).unwrap().unwrap();
    assert_eq!(row.value("a"), Some(&Value::Int(2)));
}

#[test]
fn test_equal_timestamp_tombstone_appended_last_wins() {
    let h = history(vec![cell(A, 1, 3, None), null_cell(A, 3)]);

    assert!(resolve(&schema(), &row_key(), &h, &[A], ts(4)).unwrap().is_none());
}

// =============================================================================
// Reporting Tests
// =============================================================================

#[test]
fn test_remaining_ttl_and_write_time() {
    let h = history(vec![cell(A, 1, 10, Some(30))]);

    let row = resolve(&schema(), &row_key(), &h, &[A], ts(12)).unwrap().unwrap();

    assert_eq!(row.write_time("a"), Some(ts(10)));
    assert_eq!(row.ttl_remaining("a"), Some(std::time::Duration::from_secs(18)));
    assert_eq!(row.read_time(), ts(12));
}

#[test]
fn test_request_order_is_preserved() {
    let h = history(vec![cell(A, 1, 0, None), cell(B, 2, 0, None)]);

    let row = resolve(&schema(), &row_key(), &h, &[B, K, A], ts(1)).unwrap().unwrap();
    let names: Vec<&str> = row.columns().iter().map(|c| c.name.as_str()).collect();

    assert_eq!(names, vec!["b", "k", "a"]);
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_unknown_column_id_fails() {
    let h = history(vec![cell(A, 1, 0, None)]);

    let err = resolve(&schema(), &row_key(), &h, &[ColumnId::new(42)], ts(1)).unwrap_err();
    assert!(matches!(err, AtlasError::UnknownColumn(_)));
}

#[test]
fn test_unknown_column_fails_even_for_dead_row() {
    let err = resolve(&schema(), &row_key(), &RecordHistory::new(), &[ColumnId::new(9)], ts(1)).unwrap_err();
    assert!(matches!(err, AtlasError::UnknownColumn(_)));
}
