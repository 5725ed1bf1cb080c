//! Error types for ccl.
//!
//! Hierarchical error taxonomy built with `thiserror`; domain errors compose
//! into [`AppError`] via `From` so the shell can propagate with `?`.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned from `main`
//!   - [`InputError`] - Transcript file/stdin failures (not found, no input, IO)
//!   - [`ConfigError`] - Config file read/parse failures
//!   - [`LoggingError`] - Tracing subscriber initialization failures
//!   - `std::io::Error` - Failures writing rendered output
//!
//! # Recovery Strategy
//!
//! Malformed transcript lines are **not** errors: they are skipped where they
//! are decoded and never reach this module. Fields of the wrong shape degrade
//! to neutral placeholders at render time. Everything represented here is
//! fatal to the current run.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all failure modes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read the transcript from file or stdin.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// Configuration file exists but is unusable.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Writing rendered output failed.
    ///
    /// A `BrokenPipe` here means the reader went away (`ccl log | head`);
    /// `main` treats that as a normal exit.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl AppError {
    /// True when the error is stdout being closed by the consumer.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, AppError::Output(e) if e.kind() == std::io::ErrorKind::BrokenPipe)
    }
}

/// Errors encountered when reading transcript input.
///
/// # Recovery Patterns
///
/// - **FileNotFound**: Display error and exit (user provided invalid path)
/// - **NoInput**: No file, no pipe and no discoverable project transcript
/// - **FollowRequiresFile**: `--follow` was combined with piped stdin
/// - **LineTooLong**: A line exceeded the scan buffer; the run is aborted
/// - **Io**: Generic I/O failures (permissions, disk errors)
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified transcript file does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use ccl::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.jsonl")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.jsonl"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The filesystem path that was not found.
        path: PathBuf,
    },

    /// No input source could be determined.
    #[error("No input provided and no project file found for current directory")]
    NoInput,

    /// Follow mode needs a seekable file; stdin cannot be followed.
    #[error("Follow mode (-f) only works with file input, not stdin")]
    FollowRequiresFile,

    /// A single line exceeded the configured maximum length. Fatal.
    #[error("Line {line} exceeds the maximum line length of {limit} bytes")]
    LineTooLong {
        /// 1-based line number within the current read.
        line: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Generic I/O error reading from the input source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
