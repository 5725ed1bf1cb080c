//! File-based transcript source with incremental tailing.
//!
//! [`FileTailer`] remembers how far into the file it has consumed and, on
//! each read, returns only the complete lines appended since. Growth is
//! detected by comparing the file size against that offset.

use super::lines::strip_line_ending;
use crate::model::error::InputError;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// What a size check found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    /// Nothing new since the last read.
    Unchanged,
    /// The file is longer than the consumed offset.
    Grew,
    /// The file is shorter than the consumed offset.
    Truncated {
        /// Current file length.
        len: u64,
    },
}

/// File tailer for live JSONL log following.
///
/// Tracks file position and yields complete lines appended since the last
/// read. A trailing partial line is left unconsumed until its newline arrives.
#[derive(Debug)]
pub struct FileTailer {
    path: PathBuf,
    position: u64,
    file: BufReader<File>,
    max_line_bytes: usize,
}

impl FileTailer {
    /// Create a new FileTailer for the given path, positioned at the start.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist.
    /// Returns `InputError::Io` for other I/O errors.
    pub fn new(path: impl AsRef<Path>, max_line_bytes: usize) -> Result<Self, InputError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            position: 0,
            file: BufReader::new(file),
            max_line_bytes,
        })
    }

    /// Path being tailed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset up to which the file has been consumed.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move the consumed offset, e.g. after truncation.
    pub fn reset_to(&mut self, position: u64) {
        self.position = position;
    }

    /// Compare the current file size with the consumed offset.
    pub fn check_growth(&self) -> std::io::Result<Growth> {
        let len = self.file.get_ref().metadata()?.len();
        Ok(if len > self.position {
            Growth::Grew
        } else if len < self.position {
            Growth::Truncated { len }
        } else {
            Growth::Unchanged
        })
    }

    /// Read complete lines appended since the last read.
    ///
    /// Seeks to the last known position and reads until EOF, returning lines
    /// without their line endings. Only bytes of complete lines advance the
    /// position, and only when the whole read succeeds.
    ///
    /// # Errors
    ///
    /// Returns `InputError::LineTooLong` if a line exceeds the limit.
    /// Returns `InputError::Io` for seek or read failures.
    pub fn read_new_lines(&mut self) -> Result<Vec<Vec<u8>>, InputError> {
        self.file.seek(SeekFrom::Start(self.position))?;
        let (lines, consumed) = read_complete_lines(&mut self.file, self.max_line_bytes)?;
        self.position += consumed;
        Ok(lines)
    }

    /// The unterminated bytes after the consumed offset, if any.
    ///
    /// Does not advance the position; call [`FileTailer::reset_to`] to
    /// consume the line.
    ///
    /// # Errors
    ///
    /// Returns `InputError::LineTooLong` if the pending bytes exceed the
    /// limit. Returns `InputError::Io` for seek or read failures.
    pub fn pending_partial_line(&mut self) -> Result<Option<Vec<u8>>, InputError> {
        self.file.seek(SeekFrom::Start(self.position))?;
        let mut buffer = Vec::new();
        let limit = self.max_line_bytes as u64 + 1;
        (&mut self.file).take(limit).read_until(b'\n', &mut buffer)?;

        if buffer.is_empty() || buffer.last() == Some(&b'\n') {
            return Ok(None);
        }
        if buffer.len() > self.max_line_bytes {
            return Err(InputError::LineTooLong {
                line: 1,
                limit: self.max_line_bytes,
            });
        }
        Ok(Some(buffer))
    }
}

/// Read newline-terminated lines until EOF or a partial line.
///
/// Returns the lines and the number of bytes they occupied.
fn read_complete_lines<R: BufRead>(
    reader: &mut R,
    max_line_bytes: usize,
) -> Result<(Vec<Vec<u8>>, u64), InputError> {
    let mut lines = Vec::new();
    let mut consumed = 0u64;
    let limit = max_line_bytes as u64 + 1;
    loop {
        let mut buffer = Vec::new();
        let bytes_read = (&mut *reader).take(limit).read_until(b'\n', &mut buffer)?;

        if bytes_read == 0 {
            break;
        }

        if buffer.last() == Some(&b'\n') {
            consumed += bytes_read as u64;
            lines.push(strip_line_ending(buffer));
        } else if buffer.len() > max_line_bytes {
            return Err(InputError::LineTooLong {
                line: lines.len() + 1,
                limit: max_line_bytes,
            });
        } else {
            // Partial line - don't include it, don't count its bytes
            break;
        }
    }

    Ok((lines, consumed))
}
