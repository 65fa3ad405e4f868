//! Tests for Engine
//!
//! These tests verify:
//! - Basic get/put/delete operations and read-your-writes
//! - Newest-wins reads across MemTable and SSTs
//! - Threshold-driven and manual flushes
//! - Compaction equivalence and tombstone reclamation
//! - Crash recovery from the WAL
//! - Engine lifecycle (open/close, illegal state)
//! - Input validation

use std::fs;

use minikv::config::{Config, WalSyncPolicy};
use minikv::engine::Engine;
use minikv::error::MiniKvError;
use minikv::TOMBSTONE;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .wal_sync_policy(WalSyncPolicy::Sync)
        .flush_threshold_ops(1000)
        .build();
    let engine = Engine::open(config).unwrap();
    (temp_dir, engine)
}

fn engine_at(temp_dir: &TempDir, flush_threshold_ops: usize) -> Engine {
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .wal_sync_policy(WalSyncPolicy::Sync)
        .flush_threshold_ops(flush_threshold_ops)
        .build();
    Engine::open(config).unwrap()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_engine_put_get() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put("hello", "world").unwrap();

    assert_eq!(engine.get("hello").unwrap(), Some("world".to_string()));
}

#[test]
fn test_engine_get_nonexistent_key() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(engine.get("nonexistent").unwrap(), None);
}

#[test]
fn test_engine_put_overwrite() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put("key", "value1").unwrap();
    engine.put("key", "value2").unwrap();

    assert_eq!(engine.get("key").unwrap(), Some("value2".to_string()));
}

#[test]
fn test_engine_last_write_wins_sequence() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put("a", "1").unwrap();
    engine.put("b", "2").unwrap();
    engine.put("a", "3").unwrap();

    assert_eq!(engine.get("a").unwrap(), Some("3".to_string()));
    assert_eq!(engine.get("b").unwrap(), Some("2".to_string()));
    assert_eq!(engine.get("c").unwrap(), None);
}

#[test]
fn test_engine_delete() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put("key", "value").unwrap();
    engine.delete("key").unwrap();

    assert_eq!(engine.get("key").unwrap(), None);
}

#[test]
fn test_engine_delete_nonexistent_key() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.delete("nonexistent").unwrap();
    assert_eq!(engine.get("nonexistent").unwrap(), None);
}

// =============================================================================
// Flush Tests
// =============================================================================

#[test]
fn test_engine_manual_flush() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put("key", "value").unwrap();
    assert_eq!(engine.memtable_entry_count(), 1);
    assert_eq!(engine.sstable_count(), 0);

    engine.flush().unwrap();

    assert_eq!(engine.memtable_entry_count(), 0);
    assert_eq!(engine.memtable_op_count(), 0);
    assert_eq!(engine.sstable_count(), 1);

    // Data is served from the SST now.
    assert_eq!(engine.get("key").unwrap(), Some("value".to_string()));
}

#[test]
fn test_engine_flush_empty_memtable_is_noop() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.flush().unwrap();
    assert_eq!(engine.sstable_count(), 0);
}

#[test]
fn test_engine_flush_truncates_wal() {
    let (temp, mut engine) = setup_temp_engine();

    engine.put("key", "value").unwrap();
    engine.flush().unwrap();

    let wal = fs::read_to_string(temp.path().join("wal.log")).unwrap();
    assert!(wal.is_empty());
}

#[test]
fn test_engine_auto_flush_on_threshold() {
    let temp = TempDir::new().unwrap();
    let mut engine = engine_at(&temp, 3);

    // 10 puts with a threshold of 3: flushes after ops 3, 6, and 9.
    for i in 0..10 {
        engine.put(&format!("key{i:02}"), &format!("value{i:02}")).unwrap();
    }

    assert!(
        engine.sstable_count() >= 3,
        "expected at least 3 SSTs, got {}",
        engine.sstable_count()
    );

    for i in 0..10 {
        let key = format!("key{i:02}");
        assert!(engine.get(&key).unwrap().is_some(), "key {key} should exist");
    }
}

#[test]
fn test_engine_flush_counts_operations_not_keys() {
    let temp = TempDir::new().unwrap();
    let mut engine = engine_at(&temp, 3);

    // Three writes to one key still cross the threshold.
    engine.put("hot", "1").unwrap();
    engine.put("hot", "2").unwrap();
    engine.put("hot", "3").unwrap();

    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(engine.get("hot").unwrap(), Some("3".to_string()));
}

// =============================================================================
// Compaction Tests
// =============================================================================

#[test]
fn test_engine_compact_to_single_sstable() {
    let temp = TempDir::new().unwrap();
    let mut engine = engine_at(&temp, 3);

    for i in 0..10 {
        engine.put(&format!("key{i:02}"), &format!("v{i}")).unwrap();
    }
    assert!(engine.sstable_count() >= 3);

    engine.compact().unwrap();

    assert_eq!(engine.sstable_count(), 1);
    for i in 0..10 {
        assert_eq!(
            engine.get(&format!("key{i:02}")).unwrap(),
            Some(format!("v{i}"))
        );
    }
}

#[test]
fn test_engine_compact_preserves_reads() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put("a", "1").unwrap();
    engine.put("b", "2").unwrap();
    engine.delete("a").unwrap();
    engine.flush().unwrap();
    engine.put("c", "3").unwrap();

    let before: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|k| engine.get(k).unwrap())
        .collect();

    engine.compact().unwrap();

    let after: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|k| engine.get(k).unwrap())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_engine_delete_then_compact_leaves_no_trace() {
    let (temp, mut engine) = setup_temp_engine();

    engine.put("x", "1").unwrap();
    engine.delete("x").unwrap();
    assert_eq!(engine.get("x").unwrap(), None);

    engine.flush().unwrap();
    assert_eq!(engine.get("x").unwrap(), None);

    engine.compact().unwrap();
    assert_eq!(engine.get("x").unwrap(), None);

    // No surviving SST line mentions the key or a tombstone.
    for entry in fs::read_dir(temp.path()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().is_some_and(|e| e == "sst") {
            let content = fs::read_to_string(&path).unwrap();
            assert!(!content.contains('x'));
            assert!(!content.contains(TOMBSTONE));
        }
    }
}

#[test]
fn test_engine_compact_includes_memtable() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put("flushed", "1").unwrap();
    engine.flush().unwrap();
    engine.put("pending", "2").unwrap();

    engine.compact().unwrap();

    // The pending write was flushed as part of compaction.
    assert_eq!(engine.memtable_entry_count(), 0);
    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(engine.get("pending").unwrap(), Some("2".to_string()));
}

// =============================================================================
// Crash Recovery Tests
// =============================================================================

#[test]
fn test_engine_recovery_from_wal() {
    let temp_dir = TempDir::new().unwrap();

    // First engine: write data, don't close (simulating a crash).
    {
        let mut engine = engine_at(&temp_dir, 1000);
        engine.put("key1", "value1").unwrap();
        engine.put("key2", "value2").unwrap();
        engine.delete("key1").unwrap();
        engine.put("key3", "value3").unwrap();
        drop(engine);
    }

    // Second engine: replay the WAL.
    let engine = engine_at(&temp_dir, 1000);

    assert_eq!(engine.get("key1").unwrap(), None); // deleted
    assert_eq!(engine.get("key2").unwrap(), Some("value2".to_string()));
    assert_eq!(engine.get("key3").unwrap(), Some("value3".to_string()));
}

#[test]
fn test_engine_recovery_with_sstables_and_wal() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut engine = engine_at(&temp_dir, 1000);
        engine.put("flushed", "on_disk").unwrap();
        engine.flush().unwrap();
        engine.put("pending", "in_wal").unwrap();
        drop(engine);
    }

    let engine = engine_at(&temp_dir, 1000);
    assert_eq!(engine.get("flushed").unwrap(), Some("on_disk".to_string()));
    assert_eq!(engine.get("pending").unwrap(), Some("in_wal".to_string()));
}

#[test]
fn test_engine_idempotent_open() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut engine = engine_at(&temp_dir, 1000);
        engine.put("a", "1").unwrap();
        engine.delete("b").unwrap();
        engine.close().unwrap();
    }
    {
        let mut engine = engine_at(&temp_dir, 1000);
        assert_eq!(engine.get("a").unwrap(), Some("1".to_string()));
        assert_eq!(engine.get("b").unwrap(), None);
        engine.close().unwrap();
    }

    let engine = engine_at(&temp_dir, 1000);
    assert_eq!(engine.get("a").unwrap(), Some("1".to_string()));
    assert_eq!(engine.get("b").unwrap(), None);
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_engine_open_creates_layout() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("mydb");

    let config = Config::builder().data_dir(&data_dir).build();
    let _engine = Engine::open(config).unwrap();

    assert!(data_dir.exists());
    assert!(data_dir.join("wal.log").exists());
}

#[test]
fn test_engine_open_path_convenience() {
    let temp_dir = TempDir::new().unwrap();

    let mut engine = Engine::open_path(temp_dir.path()).unwrap();

    engine.put("key", "value").unwrap();
    assert_eq!(engine.get("key").unwrap(), Some("value".to_string()));
}

#[test]
fn test_engine_closed_rejects_operations() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put("key", "value").unwrap();
    engine.close().unwrap();

    assert!(matches!(
        engine.put("key", "value2").unwrap_err(),
        MiniKvError::IllegalState(_)
    ));
    assert!(matches!(
        engine.get("key").unwrap_err(),
        MiniKvError::IllegalState(_)
    ));
    assert!(matches!(
        engine.delete("key").unwrap_err(),
        MiniKvError::IllegalState(_)
    ));
    assert!(matches!(
        engine.flush().unwrap_err(),
        MiniKvError::IllegalState(_)
    ));
    assert!(matches!(
        engine.compact().unwrap_err(),
        MiniKvError::IllegalState(_)
    ));
    assert!(matches!(
        engine.close().unwrap_err(),
        MiniKvError::IllegalState(_)
    ));
}

#[test]
fn test_engine_accessors() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .flush_threshold_ops(42)
        .build();
    let engine = Engine::open(config).unwrap();

    assert_eq!(engine.data_dir(), temp_dir.path());
    assert_eq!(engine.memtable_entry_count(), 0);
    assert_eq!(engine.memtable_op_count(), 0);
    assert_eq!(engine.sstable_count(), 0);
    assert_eq!(engine.config().flush_threshold_ops, 42);
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_engine_rejects_empty_key() {
    let (_temp, mut engine) = setup_temp_engine();

    assert!(matches!(
        engine.put("", "value").unwrap_err(),
        MiniKvError::InvalidInput(_)
    ));
    assert!(matches!(
        engine.delete("").unwrap_err(),
        MiniKvError::InvalidInput(_)
    ));
}

#[test]
fn test_engine_rejects_reserved_bytes() {
    let (_temp, mut engine) = setup_temp_engine();

    assert!(engine.put("a\tb", "value").is_err());
    assert!(engine.put("key", "a\nb").is_err());
    assert!(engine.delete("a\nb").is_err());
}

#[test]
fn test_engine_rejects_tombstone_value() {
    let (_temp, mut engine) = setup_temp_engine();

    assert!(matches!(
        engine.put("key", TOMBSTONE).unwrap_err(),
        MiniKvError::InvalidInput(_)
    ));
}

#[test]
fn test_engine_rejected_write_leaves_no_state() {
    let (_temp, mut engine) = setup_temp_engine();

    let _ = engine.put("bad\tkey", "value");

    assert_eq!(engine.memtable_op_count(), 0);
}

#[test]
fn test_engine_empty_value_roundtrip() {
    let (_temp, mut engine) = setup_temp_engine();

    engine.put("key", "").unwrap();
    assert_eq!(engine.get("key").unwrap(), Some(String::new()));

    engine.flush().unwrap();
    assert_eq!(engine.get("key").unwrap(), Some(String::new()));
}
