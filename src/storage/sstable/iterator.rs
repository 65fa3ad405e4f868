//! SSTable Iterator
//!
//! Lazy sequential decoding of all entries in an SST, in key order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{MiniKvError, Result};
use crate::record::TOMBSTONE;

/// Iterator over SST entries in ascending key order.
///
/// Yields `(key, Some(value))` for live entries and `(key, None)` for
/// tombstones.
pub struct SSTableIterator {
    path: PathBuf,
    reader: BufReader<File>,
    line_no: u64,
}

impl SSTableIterator {
    pub(super) fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            line_no: 0,
        })
    }

    fn next_entry(&mut self) -> Result<Option<(String, Option<String>)>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = line.strip_suffix('\n').unwrap_or(&line);
            if trimmed.is_empty() {
                continue;
            }

            // key and value split at the first tab; values never contain one
            let Some((key, value)) = trimmed.split_once('\t') else {
                return Err(MiniKvError::Corruption(format!(
                    "malformed line {} in {}",
                    self.line_no,
                    self.path.display()
                )));
            };

            let value = if value == TOMBSTONE {
                None
            } else {
                Some(value.to_string())
            };
            return Ok(Some((key.to_string(), value)));
        }
    }
}

impl Iterator for SSTableIterator {
    /// `(key, Option<value>)`; a `None` value is a tombstone
    type Item = Result<(String, Option<String>)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}
