//! WAL Writer
//!
//! Handles appending records to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Instant;

use crate::config::WalSyncPolicy;
use crate::error::Result;
use crate::record::Record;

use super::SyncPolicy;

/// Appends records to the WAL file, syncing per the configured policy
pub struct WalWriter {
    /// Buffered file writer (batches writes in memory)
    file: BufWriter<File>,

    /// Decides when appends must be forced to stable storage
    policy: SyncPolicy,

    /// Number of durability barriers executed so far
    sync_count: u64,
}

impl WalWriter {
    /// Open or create a WAL file in append mode.
    ///
    /// Existing records are preserved; replay the file before opening a
    /// writer so recovered state is not lost.
    pub fn open(path: &Path, policy: WalSyncPolicy) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(WalWriter {
            file: BufWriter::new(file),
            policy: SyncPolicy::new(policy, Instant::now()),
            sync_count: 0,
        })
    }

    /// Append a record.
    ///
    /// Returns only after the policy's barrier rule has been honored for
    /// this record: if the policy demands a sync, the data is on stable
    /// storage by the time this returns.
    pub fn append(&mut self, record: &Record) -> Result<()> {
        let line = record.encode();
        self.file.write_all(line.as_bytes())?;

        if self.policy.on_append(Instant::now()) {
            self.sync()?;
        }

        Ok(())
    }

    /// Force buffered records to stable storage (fsync)
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.get_ref().sync_all()?;

        self.sync_count += 1;
        self.policy.note_synced(Instant::now());

        Ok(())
    }

    /// Sync if the policy's time deadline has passed with records pending.
    ///
    /// Time-driven hook for embedders: with no background threads, interval
    /// and idle deadlines are otherwise only honored at the next append.
    /// Returns whether a sync ran.
    pub fn sync_if_idle(&mut self) -> Result<bool> {
        if self.policy.idle_sync_due(Instant::now()) {
            self.sync()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Atomically replace the WAL with an empty file.
    ///
    /// Called only after a flush or compaction has durably captured the
    /// log's contents in SST form.
    pub fn truncate(&mut self) -> Result<()> {
        self.file.flush()?;

        let file = self.file.get_mut();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.sync_all()?;

        self.sync_count += 1;
        self.policy.note_synced(Instant::now());

        Ok(())
    }

    /// Records appended since the last sync
    pub fn pending_records(&self) -> usize {
        self.policy.pending()
    }

    /// Number of durability barriers executed by this writer
    pub fn sync_count(&self) -> u64 {
        self.sync_count
    }

    /// The active sync policy state
    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }
}
