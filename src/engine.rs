//! Engine Module
//!
//! The core storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Coordinate WAL, MemTable, and Storage
//! - Order every write as WAL append first, MemTable second
//! - Trigger flushes when the MemTable operation count crosses the threshold
//! - Manage crash recovery on startup
//!
//! One logical writer, no background threads: mutating calls take
//! `&mut self` and flush/compaction run synchronously on the calling path.

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{MiniKvError, Result};
use crate::memtable::{MemTable, MemTableEntry};
use crate::record::{self, Record};
use crate::storage::{Lookup, StorageManager};
use crate::wal::{self, WalWriter};

/// The main storage engine
pub struct Engine {
    config: Config,
    wal: WalWriter,
    memtable: MemTable,
    storage: StorageManager,
    open: bool,
}

impl Engine {
    /// Open or create an engine with the given config.
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Discover existing SSTs
    /// 3. Replay the WAL into a fresh MemTable
    /// 4. Open the WAL for appending and resume service
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let storage = StorageManager::open(&config.data_dir)?;

        let wal_file = config.wal_file();
        let mut memtable = MemTable::new();
        let report = wal::replay(&wal_file, |record| {
            Self::apply(&mut memtable, record);
        })?;

        if report.records_applied > 0 || report.torn_tail {
            tracing::info!(
                records = report.records_applied,
                torn_tail = report.torn_tail,
                "recovered MemTable from WAL"
            );
        }

        let wal = WalWriter::open(&wal_file, config.wal_sync_policy)?;

        tracing::debug!(
            dir = %config.data_dir.display(),
            sstables = storage.sstable_count(),
            recovered = report.records_applied,
            "engine open"
        );

        Ok(Self {
            config,
            wal,
            memtable,
            storage,
            open: true,
        })
    }

    /// Open with a directory path and default configuration
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Put a key-value pair.
    ///
    /// The record is durable per the configured WAL sync policy by the
    /// time this returns; the MemTable is only updated after the WAL
    /// append succeeds.
    pub fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.ensure_open()?;
        record::validate_key(key)?;
        record::validate_value(value)?;

        let record = Record::Put {
            key: key.to_string(),
            value: value.to_string(),
        };
        self.wal.append(&record)?;
        Self::apply(&mut self.memtable, record);

        self.maybe_flush()
    }

    /// Delete a key by writing a tombstone
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.ensure_open()?;
        record::validate_key(key)?;

        let record = Record::Delete {
            key: key.to_string(),
        };
        self.wal.append(&record)?;
        Self::apply(&mut self.memtable, record);

        self.maybe_flush()
    }

    /// Get a value by key.
    ///
    /// Probes the MemTable first, then the SSTs newest → oldest; the
    /// newest layer wins and a tombstone reads as absent.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.ensure_open()?;

        match self.memtable.get(key) {
            Some(MemTableEntry::Value(value)) => return Ok(Some(value.clone())),
            Some(MemTableEntry::Tombstone) => return Ok(None),
            None => {}
        }

        match self.storage.get(key)? {
            Lookup::Found(value) => Ok(Some(value)),
            Lookup::Tombstone | Lookup::NotFound => Ok(None),
        }
    }

    /// Flush the MemTable to a new SST and checkpoint the WAL.
    ///
    /// Order matters for crash safety: sync the WAL tail, write and rename
    /// the SST, truncate the WAL, and only then reset the MemTable. A
    /// failure at any step leaves the WAL authoritative for replay.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;

        if self.memtable.is_empty() {
            return Ok(());
        }

        self.wal.sync()?;
        self.storage.flush(&self.memtable)?;
        self.wal.truncate()?;
        self.memtable.clear();

        Ok(())
    }

    /// Merge all SSTs into one newest-wins snapshot, dropping tombstones.
    ///
    /// Flushes the MemTable first so the snapshot captures the full
    /// logical state, then truncates the WAL as the checkpoint.
    pub fn compact(&mut self) -> Result<()> {
        self.ensure_open()?;

        self.flush()?;
        self.storage.compact()?;
        self.wal.truncate()?;

        Ok(())
    }

    /// Close the engine: final WAL sync, then refuse further operations.
    ///
    /// The MemTable is not flushed; the synced WAL replays on next open.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_open()?;

        self.wal.sync()?;
        self.open = false;

        tracing::debug!(dir = %self.config.data_dir.display(), "engine closed");

        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of distinct keys in the MemTable
    pub fn memtable_entry_count(&self) -> usize {
        self.memtable.entry_count()
    }

    /// Logical operations absorbed by the MemTable since the last flush
    pub fn memtable_op_count(&self) -> usize {
        self.memtable.op_count()
    }

    /// Number of SSTs on disk
    pub fn sstable_count(&self) -> usize {
        self.storage.sstable_count()
    }

    /// Number of WAL durability barriers executed
    pub fn wal_sync_count(&self) -> u64 {
        self.wal.sync_count()
    }

    /// The data directory
    pub fn data_dir(&self) -> &Path {
        self.storage.data_dir()
    }

    /// The engine configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Apply a record to a MemTable. Shared by the write path and WAL
    /// replay so both produce identical state.
    fn apply(memtable: &mut MemTable, record: Record) {
        match record {
            Record::Put { key, value } => memtable.put(key, value),
            Record::Delete { key } => memtable.delete(key),
        }
    }

    fn maybe_flush(&mut self) -> Result<()> {
        if self.memtable.should_flush(self.config.flush_threshold_ops) {
            self.flush()?;
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if !self.open {
            return Err(MiniKvError::IllegalState(
                "engine is closed".to_string(),
            ));
        }
        Ok(())
    }
}
