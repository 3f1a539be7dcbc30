//! Transcript decoding: lazy JSONL reader that tolerates corrupt lines.

use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use super::types::LogEntry;

/// Decode a single line. Blank, corrupt, or irrelevant lines yield `None`.
pub fn decode_line(line: &str) -> Option<LogEntry> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(trimmed).ok()?;
    LogEntry::from_value(&value)
}

/// One-pass iterator over the retained entries of a JSONL source.
///
/// Only read failures of the underlying source surface as errors; once one
/// is returned the iterator is exhausted.
pub struct Decoder<R> {
    reader: R,
    buf: Vec<u8>,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_number: 0,
            done: false,
        }
    }
}

impl Decoder<BufReader<File>> {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for Decoder<R> {
    type Item = io::Result<LogEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line_number += 1;
                    let Ok(line) = std::str::from_utf8(&self.buf) else {
                        debug!(line = self.line_number, "skipping non-UTF-8 line");
                        continue;
                    };
                    if let Some(entry) = decode_line(line) {
                        return Some(Ok(entry));
                    }
                    if !line.trim().is_empty() {
                        debug!(line = self.line_number, "skipping unrecognized line");
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}
