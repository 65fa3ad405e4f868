//! Storage Manager
//!
//! Manages the SST stack and coordinates reads, flushes, and compaction.
//!
//! ## Responsibilities
//! - Discover existing SSTs on startup and clean up interrupted builds
//! - Search SSTs newest → oldest for reads
//! - Create new SSTs from MemTable flushes
//! - Full compaction: merge everything into one SST, reclaim tombstones

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::memtable::{MemTable, MemTableEntry};

use super::compaction::MergeIterator;
use super::sstable::{self, Lookup, SSTableBuilder, SSTableReader, TMP_EXTENSION};

/// Manages the storage layer
pub struct StorageManager {
    /// Directory where SSTs are stored
    data_dir: PathBuf,

    /// Open SST readers, ordered newest → oldest
    sstables: Vec<SSTableReader>,

    /// Ordinal for the next SST to create
    next_ordinal: u64,
}

impl StorageManager {
    /// Open or create storage in the given directory.
    ///
    /// On startup:
    /// 1. Create the directory if it doesn't exist
    /// 2. Remove temporary files left by interrupted builds
    /// 3. Discover SST files and their ordinals
    /// 4. Open readers, ordered newest first
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)?;

        let mut discovered: Vec<(u64, PathBuf)> = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let file_path = entry.path();
            if !file_path.is_file() {
                continue;
            }

            // Stale .tmp files are partial SSTs from a crashed build.
            if file_path
                .extension()
                .is_some_and(|ext| ext == TMP_EXTENSION)
            {
                tracing::debug!(path = %file_path.display(), "removing stale temporary file");
                fs::remove_file(&file_path)?;
                continue;
            }

            if let Some(ordinal) = sstable::parse_sstable_ordinal(&file_path) {
                discovered.push((ordinal, file_path));
            }
        }

        // Newest first (greatest ordinal first)
        discovered.sort_by(|a, b| b.0.cmp(&a.0));

        let next_ordinal = discovered.first().map(|(id, _)| id + 1).unwrap_or(1);

        let mut sstables = Vec::with_capacity(discovered.len());
        for (ordinal, file_path) in &discovered {
            sstables.push(SSTableReader::open(file_path, *ordinal)?);
        }

        tracing::debug!(
            dir = %path.display(),
            sstables = sstables.len(),
            next_ordinal,
            "storage opened"
        );

        Ok(Self {
            data_dir: path.to_path_buf(),
            sstables,
            next_ordinal,
        })
    }

    /// Look up a key across all SSTs, newest → oldest.
    ///
    /// The first SST containing the key decides the outcome: a live value
    /// or a tombstone from a newer SST shadows everything older.
    pub fn get(&self, key: &str) -> Result<Lookup> {
        for reader in &self.sstables {
            match reader.lookup(key)? {
                Lookup::NotFound => continue,
                hit => return Ok(hit),
            }
        }
        Ok(Lookup::NotFound)
    }

    /// Write a MemTable snapshot to a new SST at the next ordinal.
    ///
    /// Entries come out of the BTreeMap already sorted and deduplicated.
    /// The new file joins the stack as the newest.
    pub fn flush(&mut self, memtable: &MemTable) -> Result<()> {
        let ordinal = self.next_ordinal;
        let mut builder = SSTableBuilder::create(&self.data_dir, ordinal)?;

        for (key, entry) in memtable.iter() {
            match entry {
                MemTableEntry::Value(v) => builder.add(key, v)?,
                MemTableEntry::Tombstone => builder.add_tombstone(key)?,
            }
        }

        let entries = builder.entry_count();
        let reader = builder.finish()?;
        self.next_ordinal = ordinal + 1;
        self.sstables.insert(0, reader);

        tracing::debug!(ordinal, entries, "memtable flushed to SST");

        Ok(())
    }

    /// Merge every SST into one snapshot at a fresh ordinal.
    ///
    /// Newest-wins across inputs; a winning tombstone is dropped entirely,
    /// since after a full merge no older layer can resurrect the key. The
    /// inputs are deleted only after the new SST is visible under its
    /// final name. If nothing survives, no output is written and the store
    /// ends with zero SSTs.
    pub fn compact(&mut self) -> Result<()> {
        if self.sstables.is_empty() {
            return Ok(());
        }

        let mut inputs = Vec::with_capacity(self.sstables.len());
        for reader in &self.sstables {
            inputs.push((reader.ordinal(), reader.iter()?));
        }
        let merged = MergeIterator::new(inputs)?;

        let input_count = self.sstables.len();
        let ordinal = self.next_ordinal;
        let mut builder = SSTableBuilder::create(&self.data_dir, ordinal)?;

        for item in merged {
            let (key, value) = item?;
            if let Some(v) = value {
                builder.add(&key, &v)?;
            }
        }

        let survivors = builder.entry_count();
        let output = if survivors > 0 {
            let reader = builder.finish()?;
            self.next_ordinal = ordinal + 1;
            Some(reader)
        } else {
            builder.abort()?;
            None
        };

        // The old files are now redundant; losing the process between the
        // rename above and these deletes only leaves harmless duplicates.
        for reader in self.sstables.drain(..) {
            match fs::remove_file(reader.path()) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.sstables.extend(output);

        tracing::info!(
            inputs = input_count,
            survivors,
            "compaction complete"
        );

        Ok(())
    }

    /// Number of SSTs currently in the stack
    pub fn sstable_count(&self) -> usize {
        self.sstables.len()
    }

    /// The data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The ordinal the next created SST will use
    pub fn next_ordinal(&self) -> u64 {
        self.next_ordinal
    }

    /// Paths of the SSTs in the stack, newest → oldest
    pub fn sstable_paths(&self) -> Vec<PathBuf> {
        self.sstables.iter().map(|r| r.path().to_path_buf()).collect()
    }
}
