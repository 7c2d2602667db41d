//! Tests for WAL Recovery
//!
//! These tests verify:
//! - Replay of clean logs
//! - Torn-tail truncation
//! - LSN regression and mid-log corruption are fatal
//! - Engine rebuild from replayed frames gives the same reads

use std::sync::Arc;
use std::time::Duration;

use atlasrow::schema::ColumnId;
use atlasrow::store::{CellValue, Record};
use atlasrow::wal::{CellLog, MemoryLog, WalEntry, WalRecovery};
use atlasrow::{
    AtlasError, Config, DataType, Engine, ManualClock, PartialUpdate, RowDelete, RowInsert, RowKey,
    TableSchema, Timestamp,
};
use tracing_subscriber::EnvFilter;

// =============================================================================
// Helper Functions
// =============================================================================

/// Route engine logs to the test output; RUST_LOG overrides the level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

fn schema() -> TableSchema {
    TableSchema::builder("t")
        .partition_key("k", DataType::Int)
        .column("a", DataType::Int)
        .column("b", DataType::Int)
        .build()
        .unwrap()
}

fn frame(lsn: u64, k: i32, record: Record) -> Vec<u8> {
    WalEntry::new(lsn, RowKey::new([k]), record).serialize().unwrap()
}

fn cell(value: i32, secs: i64) -> Record {
    Record::cell(
        ColumnId::new(1),
        CellValue::Value(value.into()),
        Timestamp::from_secs(secs),
        None,
    )
}

// =============================================================================
// Replay Tests
// =============================================================================

#[test]
fn test_replay_empty_log() {
    let (entries, result) = WalRecovery::replay(&[]).unwrap();

    assert!(entries.is_empty());
    assert_eq!(result.entries_recovered, 0);
    assert_eq!(result.last_lsn, 0);
    assert!(!result.was_truncated);
}

#[test]
fn test_replay_clean_log() {
    let mut bytes = frame(1, 1, cell(1, 1));
    bytes.extend(frame(2, 2, cell(2, 1)));
    bytes.extend(frame(5, 1, Record::row_tombstone(Timestamp::from_secs(2))));

    let (entries, result) = WalRecovery::replay(&bytes).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(result.last_lsn, 5);
    assert_eq!(result.valid_len, bytes.len());
}

#[test]
fn test_torn_tail_is_dropped() {
    init_tracing();
    let mut bytes = frame(1, 1, cell(1, 1));
    let valid = bytes.len();
    let second = frame(2, 1, cell(2, 2));
    bytes.extend_from_slice(&second[..second.len() / 2]);

    let (entries, result) = WalRecovery::replay(&bytes).unwrap();

    assert_eq!(entries.len(), 1);
    assert!(result.was_truncated);
    assert_eq!(result.valid_len, valid);
    assert_eq!(result.last_lsn, 1);
}

#[test]
fn test_torn_header_is_dropped() {
    let mut bytes = frame(1, 1, cell(1, 1));
    bytes.extend_from_slice(&[0u8; 5]);

    let result = WalRecovery::verify(&bytes).unwrap();
    assert!(result.was_truncated);
    assert_eq!(result.entries_recovered, 1);
}

#[test]
fn test_lsn_regression_is_corruption() {
    let mut bytes = frame(2, 1, cell(1, 1));
    bytes.extend(frame(2, 1, cell(2, 2)));

    let err = WalRecovery::replay(&bytes).unwrap_err();
    assert!(matches!(err, AtlasError::HistoryCorruption(_)));
}

#[test]
fn test_corrupt_middle_frame_is_fatal() {
    let mut first = frame(1, 1, cell(1, 1));
    let last = first.len() - 1;
    first[last] ^= 0x01;
    let mut bytes = first;
    bytes.extend(frame(2, 1, cell(2, 2)));

    let err = WalRecovery::replay(&bytes).unwrap_err();
    assert!(matches!(err, AtlasError::HistoryCorruption(_)));
}

// =============================================================================
// Engine Rebuild Tests
// =============================================================================

#[test]
fn test_engine_recovers_identical_view() {
    init_tracing();
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(10)));
    let log = Arc::new(MemoryLog::new());
    let original = Engine::with_parts(schema(), Config::default(), clock.clone(), log.clone());

    original.insert(RowInsert::new(RowKey::new([1])).value("a", 1).ttl(5)).unwrap();
    clock.advance(Duration::from_millis(1));
    original.update(PartialUpdate::new(RowKey::new([1])).set("b", 2)).unwrap();
    clock.advance(Duration::from_millis(1));
    original.update(PartialUpdate::new(RowKey::new([2])).set("a", 3).ttl(1)).unwrap();
    clock.advance(Duration::from_millis(1));
    original.delete(RowDelete::new(RowKey::new([3]))).unwrap();

    let (recovered, new_log, result) =
        Engine::recover(schema(), Config::default(), clock.clone(), &log.frames()).unwrap();

    assert_eq!(result.entries_recovered, 5);
    assert_eq!(recovered.row_count(), 3);
    assert_eq!(new_log.last_lsn(), 5);

    for secs in [10, 12, 16, 100] {
        for k in 1..=3 {
            let key = RowKey::new([k]);
            let at = Timestamp::from_secs(secs);
            assert_eq!(
                original.get_at(&key, &["k", "a", "b"], at).unwrap(),
                recovered.get_at(&key, &["k", "a", "b"], at).unwrap(),
                "row {} at {}s",
                k,
                secs
            );
        }
    }
}

#[test]
fn test_recovered_engine_continues_lsn_numbering() {
    let bytes = frame(7, 1, cell(1, 1));
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(5)));

    let (engine, log, _) = Engine::recover(schema(), Config::default(), clock, &bytes).unwrap();
    engine.update(PartialUpdate::new(RowKey::new([1])).set("a", 9)).unwrap();

    assert_eq!(engine.last_lsn(), 8);
    assert_eq!(log.entry_count(), 1);
    let seqs: Vec<u64> = engine
        .history(&RowKey::new([1]))
        .unwrap()
        .records()
        .map(|(seq, _)| seq)
        .collect();
    assert_eq!(seqs, vec![7, 8]);
}

#[test]
fn test_recovery_rejects_records_outside_schema() {
    let bytes = frame(
        1,
        1,
        Record::cell(ColumnId::new(40), CellValue::Tombstone, Timestamp::EPOCH, None),
    );

    let result = Engine::recover(schema(), Config::default(), Arc::new(ManualClock::default()), &bytes);
    assert!(matches!(result, Err(AtlasError::HistoryCorruption(_))));
}

#[test]
fn test_recovery_rejects_cells_on_key_columns() {
    let bytes = frame(
        1,
        1,
        Record::cell(ColumnId::new(0), CellValue::Value(2.into()), Timestamp::EPOCH, None),
    );

    let result = Engine::recover(schema(), Config::default(), Arc::new(ManualClock::default()), &bytes);
    assert!(matches!(result, Err(AtlasError::HistoryCorruption(_))));
}

#[test]
fn test_recovery_rejects_keys_outside_schema() {
    let bytes = WalEntry::new(1, RowKey::new(["text"]), Record::row_tombstone(Timestamp::EPOCH))
        .serialize()
        .unwrap();

    let result = Engine::recover(schema(), Config::default(), Arc::new(ManualClock::default()), &bytes);
    assert!(matches!(result, Err(AtlasError::HistoryCorruption(_))));
}
