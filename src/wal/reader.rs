//! WAL Reader
//!
//! Strict sequential decoding of WAL records. Crash tolerance lives in
//! [`super::recovery`]; this reader surfaces every decode failure.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{MiniKvError, Result};
use crate::record::Record;

/// Reads records from a WAL file in order
#[derive(Debug)]
pub struct WalReader {
    reader: BufReader<File>,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(WalReader {
            reader: BufReader::new(file),
        })
    }

    /// Read the next raw line, without its terminator.
    ///
    /// The flag reports whether the line was newline-terminated; a final
    /// unterminated line is the signature of a torn write.
    pub(super) fn next_line(&mut self) -> Result<Option<(String, bool)>> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }

        let terminated = line.ends_with('\n');
        if terminated {
            line.pop();
        }
        Ok(Some((line, terminated)))
    }

    /// Decode the next record, skipping empty lines.
    ///
    /// Returns `Ok(None)` at end of file and an error for any malformed
    /// or unterminated line.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            match self.next_line()? {
                None => return Ok(None),
                Some((line, _)) if line.is_empty() => continue,
                Some((line, terminated)) => {
                    if !terminated {
                        return Err(MiniKvError::MalformedRecord(
                            "unterminated trailing record".to_string(),
                        ));
                    }
                    return Record::decode(&line).map(Some);
                }
            }
        }
    }
}
