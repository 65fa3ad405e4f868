//! Record codec
//!
//! Encodes and decodes the logical write operations that flow through the
//! WAL, one tab-separated line per record:
//!
//! ```text
//! PUT\t{key}\t{value}\n
//! DEL\t{key}\t\n
//! ```
//!
//! Keys and values are UTF-8 text and must not contain the field delimiter
//! (`\t`) or the record terminator (`\n`); [`validate_key`] and
//! [`validate_value`] enforce this before anything reaches the log.

use crate::error::{MiniKvError, Result};

/// Sentinel value marking a deleted key in SST files and in
/// PUT-encoded deletions.
pub const TOMBSTONE: &str = "__TOMBSTONE__";

/// A single logical operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Put a key-value pair
    Put { key: String, value: String },

    /// Delete a key
    Delete { key: String },
}

impl Record {
    /// The key this record operates on
    pub fn key(&self) -> &str {
        match self {
            Record::Put { key, .. } => key,
            Record::Delete { key } => key,
        }
    }

    /// Encode as a single newline-terminated line
    pub fn encode(&self) -> String {
        match self {
            Record::Put { key, value } => format!("PUT\t{key}\t{value}\n"),
            Record::Delete { key } => format!("DEL\t{key}\t\n"),
        }
    }

    /// Decode one line (without its trailing newline).
    ///
    /// Accepts the two-field `DEL\tkey` form alongside the three-field
    /// frame, and folds a PUT of the tombstone sentinel into a `Delete`.
    pub fn decode(line: &str) -> Result<Record> {
        let fields: Vec<&str> = line.split('\t').collect();
        match fields.as_slice() {
            ["PUT", key, value] => {
                if *value == TOMBSTONE {
                    Ok(Record::Delete {
                        key: (*key).to_string(),
                    })
                } else {
                    Ok(Record::Put {
                        key: (*key).to_string(),
                        value: (*value).to_string(),
                    })
                }
            }
            ["DEL", key] | ["DEL", key, ""] => Ok(Record::Delete {
                key: (*key).to_string(),
            }),
            ["DEL", _, _] => Err(MiniKvError::MalformedRecord(
                "DEL record carries a value".to_string(),
            )),
            [op, ..] if *op != "PUT" && *op != "DEL" => Err(MiniKvError::MalformedRecord(
                format!("unknown op {op:?}"),
            )),
            _ => Err(MiniKvError::MalformedRecord(format!(
                "expected 3 fields, got {}",
                fields.len()
            ))),
        }
    }
}

// =============================================================================
// Input Validation
// =============================================================================

/// Reject keys that cannot be framed: empty, or containing `\t` / `\n`
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(MiniKvError::InvalidInput("key must not be empty".to_string()));
    }
    validate_text("key", key)
}

/// Reject values that cannot be framed or that collide with the
/// tombstone sentinel
pub fn validate_value(value: &str) -> Result<()> {
    if value == TOMBSTONE {
        return Err(MiniKvError::InvalidInput(format!(
            "value {TOMBSTONE:?} is reserved"
        )));
    }
    validate_text("value", value)
}

fn validate_text(what: &str, text: &str) -> Result<()> {
    if text.contains('\t') || text.contains('\n') {
        return Err(MiniKvError::InvalidInput(format!(
            "{what} must not contain tab or newline"
        )));
    }
    Ok(())
}
