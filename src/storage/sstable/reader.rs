//! SSTable Reader
//!
//! Opens SST files and provides point lookups over the sorted lines.
//! Min/max keys are cached for cheap range pruning before a scan; the
//! file itself is never modified.

use std::path::{Path, PathBuf};

use crate::error::Result;

use super::iterator::SSTableIterator;
use super::Lookup;

/// Read handle for one immutable SST file
#[derive(Debug)]
pub struct SSTableReader {
    path: PathBuf,
    ordinal: u64,
    min_key: Option<String>,
    max_key: Option<String>,
}

impl SSTableReader {
    /// Open a discovered SST, scanning it once for key-range metadata
    pub fn open(path: &Path, ordinal: u64) -> Result<Self> {
        let mut min_key = None;
        let mut max_key = None;

        for entry in SSTableIterator::open(path)? {
            let (key, _) = entry?;
            if min_key.is_none() {
                min_key = Some(key.clone());
            }
            max_key = Some(key);
        }

        Ok(Self {
            path: path.to_path_buf(),
            ordinal,
            min_key,
            max_key,
        })
    }

    /// Build a reader from metadata already known (fresh from a builder)
    pub(crate) fn from_parts(
        path: PathBuf,
        ordinal: u64,
        min_key: Option<String>,
        max_key: Option<String>,
    ) -> Self {
        Self {
            path,
            ordinal,
            min_key,
            max_key,
        }
    }

    /// Creation ordinal encoded in the file name; greater is newer
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Smallest key in this SST (None for an empty file)
    pub fn min_key(&self) -> Option<&str> {
        self.min_key.as_deref()
    }

    /// Largest key in this SST (None for an empty file)
    pub fn max_key(&self) -> Option<&str> {
        self.max_key.as_deref()
    }

    /// Quick range check: false only if the key is definitely absent
    pub fn might_contain(&self, key: &str) -> bool {
        match (&self.min_key, &self.max_key) {
            (Some(min), Some(max)) => key >= min.as_str() && key <= max.as_str(),
            _ => false,
        }
    }

    /// Point lookup via a linear scan of the sorted lines.
    ///
    /// Stops early once past the key's position in the order.
    pub fn lookup(&self, key: &str) -> Result<Lookup> {
        if !self.might_contain(key) {
            return Ok(Lookup::NotFound);
        }

        for entry in self.iter()? {
            let (entry_key, value) = entry?;
            if entry_key.as_str() > key {
                break;
            }
            if entry_key == key {
                return Ok(match value {
                    Some(v) => Lookup::Found(v),
                    None => Lookup::Tombstone,
                });
            }
        }

        Ok(Lookup::NotFound)
    }

    /// Iterate all entries in ascending key order
    pub fn iter(&self) -> Result<SSTableIterator> {
        SSTableIterator::open(&self.path)
    }
}
