//! Bounded line splitting for JSONL input.
//!
//! Lines are split on `\n` with a trailing `\r` removed. A line longer than
//! the configured limit is a fatal error rather than a skip.

use crate::model::error::InputError;
use std::io::{BufRead, Read};

/// Default maximum line length (10 MiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

/// Iterator over the lines of a reader, enforcing a maximum line length.
///
/// A final line without a terminating newline is still yielded. Iteration
/// stops after the first error.
#[derive(Debug)]
pub struct LineReader<R> {
    reader: R,
    max_line_bytes: usize,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> LineReader<R> {
    /// Wrap `reader`, rejecting lines longer than `max_line_bytes`.
    pub fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            reader,
            max_line_bytes,
            line_number: 0,
            done: false,
        }
    }

    fn read_line(&mut self) -> Result<Option<Vec<u8>>, InputError> {
        let mut buf = Vec::new();
        // One byte of slack distinguishes "exactly at the limit" from "over it".
        let limit = self.max_line_bytes as u64 + 1;
        let read = (&mut self.reader).take(limit).read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(None);
        }

        self.line_number += 1;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        } else if buf.len() > self.max_line_bytes {
            return Err(InputError::LineTooLong {
                line: self.line_number,
                limit: self.max_line_bytes,
            });
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<Vec<u8>, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.read_line().transpose();
        if !matches!(result, Some(Ok(_))) {
            self.done = true;
        }
        result
    }
}

/// Remove a trailing `\n` and then a trailing `\r`, as [`LineReader`] does.
pub fn strip_line_ending(mut line: Vec<u8>) -> Vec<u8> {
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    line
}
