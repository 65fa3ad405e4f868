//! SSTable Module
//!
//! Sorted String Table: immutable on-disk sorted key-value lines.
//!
//! Files are written under a temporary name and renamed into place on
//! close, so a partial file never becomes visible under its final name.

mod builder;
mod iterator;
mod reader;

use std::path::{Path, PathBuf};

pub use builder::SSTableBuilder;
pub use iterator::SSTableIterator;
pub use reader::SSTableReader;

/// Extension for in-progress SST files, cleaned up on startup
pub(crate) const TMP_EXTENSION: &str = "tmp";

/// Outcome of a point lookup against a single SST
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Key present with a live value
    Found(String),

    /// Key present as a deletion marker
    Tombstone,

    /// Key not in this SST
    NotFound,
}

/// Final file name for an SST with the given creation ordinal
pub(crate) fn sstable_file_name(ordinal: u64) -> String {
    format!("sst_{ordinal:06}.sst")
}

/// Temporary build name for an SST with the given creation ordinal
pub(crate) fn sstable_tmp_name(ordinal: u64) -> String {
    format!("sst_{ordinal:06}.{TMP_EXTENSION}")
}

/// Parse the creation ordinal from an SST path.
/// `sst_000042.sst` → `Some(42)`; temporary and foreign files → `None`
pub(crate) fn parse_sstable_ordinal(path: &Path) -> Option<u64> {
    if path.extension()?.to_str()? != "sst" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("sst_")?.parse().ok()
}

/// Join an SST file name onto its data directory
pub(crate) fn sstable_path(dir: &Path, ordinal: u64) -> PathBuf {
    dir.join(sstable_file_name(ordinal))
}
