//! SSTable Builder
//!
//! Writes sorted key-value entries to a new SST file. All output goes to a
//! temporary path; `finish` syncs and renames it into place, so a crash
//! mid-build leaves no visible SST.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::error::{MiniKvError, Result};
use crate::record::TOMBSTONE;

use super::reader::SSTableReader;
use super::{sstable_path, sstable_tmp_name};

/// Builder for creating a new SST from entries in ascending key order
pub struct SSTableBuilder {
    ordinal: u64,
    tmp_path: PathBuf,
    final_path: PathBuf,
    writer: BufWriter<File>,
    entry_count: u64,
    last_key: Option<String>,
    min_key: Option<String>,
    max_key: Option<String>,
}

impl SSTableBuilder {
    /// Start building the SST with the given ordinal under `dir`.
    ///
    /// Call `add`/`add_tombstone` in ascending key order, then `finish`.
    pub fn create(dir: &std::path::Path, ordinal: u64) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let tmp_path = dir.join(sstable_tmp_name(ordinal));
        let final_path = sstable_path(dir, ordinal);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        Ok(Self {
            ordinal,
            tmp_path,
            final_path,
            writer: BufWriter::new(file),
            entry_count: 0,
            last_key: None,
            min_key: None,
            max_key: None,
        })
    }

    /// Add a key-value pair (must be called in ascending key order)
    pub fn add(&mut self, key: &str, value: &str) -> Result<()> {
        self.write_entry(key, value)
    }

    /// Add a tombstone (must be called in ascending key order)
    pub fn add_tombstone(&mut self, key: &str) -> Result<()> {
        self.write_entry(key, TOMBSTONE)
    }

    fn write_entry(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(last) = &self.last_key {
            if key <= last.as_str() {
                return Err(MiniKvError::InvalidInput(format!(
                    "keys must be added in strictly ascending order ({key:?} after {last:?})"
                )));
            }
        }

        self.writer.write_all(key.as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.writer.write_all(value.as_bytes())?;
        self.writer.write_all(b"\n")?;

        if self.min_key.is_none() {
            self.min_key = Some(key.to_string());
        }
        self.max_key = Some(key.to_string());
        self.last_key = Some(key.to_string());
        self.entry_count += 1;

        Ok(())
    }

    /// Number of entries written so far
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    /// Sync the temporary file and rename it into place.
    ///
    /// Returns a reader carrying the key-range metadata captured during
    /// the build.
    pub fn finish(self) -> Result<SSTableReader> {
        let mut writer = self.writer;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);

        fs::rename(&self.tmp_path, &self.final_path)?;

        Ok(SSTableReader::from_parts(
            self.final_path,
            self.ordinal,
            self.min_key,
            self.max_key,
        ))
    }

    /// Abandon the build and remove the temporary file
    pub fn abort(self) -> Result<()> {
        drop(self.writer);
        match fs::remove_file(&self.tmp_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
