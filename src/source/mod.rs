//! Transcript input sources.
//!
//! This module provides:
//! - Input source detection (explicit file, piped stdin, project discovery)
//! - A bounded line reader shared by every mode
//! - A file tailer for follow mode

use crate::model::error::InputError;
use std::io::IsTerminal;
use std::path::PathBuf;

pub mod file;
pub mod lines;
pub mod project;

pub use file::{FileTailer, Growth};
pub use lines::{LineReader, DEFAULT_MAX_LINE_BYTES};

/// Where the transcript comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A transcript file, given explicitly or discovered.
    File(PathBuf),
    /// Piped standard input.
    Stdin,
}

/// How the processor walks the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    /// Single pass, rendering as lines arrive.
    Streaming,
    /// Correlate everything first, then render.
    Buffered,
    /// Buffered over existing content, then tail the file.
    Follow,
}

impl InputSource {
    /// Processing mode for this source.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FollowRequiresFile` when following stdin.
    pub fn mode(&self, follow: bool) -> Result<ProcessingMode, InputError> {
        match (self, follow) {
            (InputSource::File(_), true) => Ok(ProcessingMode::Follow),
            (InputSource::File(_), false) => Ok(ProcessingMode::Buffered),
            (InputSource::Stdin, true) => Err(InputError::FollowRequiresFile),
            (InputSource::Stdin, false) => Ok(ProcessingMode::Streaming),
        }
    }
}

/// Detect the input source for this process.
///
/// # Logic:
/// 1. If a file path is provided: use it (it must exist)
/// 2. If stdin is piped: use stdin
/// 3. Else: the newest transcript of the current project
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if the given file does not exist.
/// Returns `InputError::NoInput` if nothing could be found.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    let stdin_piped = !std::io::stdin().is_terminal();
    detect_input_source_with(file, stdin_piped, project::find_project_file)
}

/// [`detect_input_source`] with the environment probes injected.
pub fn detect_input_source_with(
    file: Option<PathBuf>,
    stdin_piped: bool,
    discover: impl FnOnce() -> Option<PathBuf>,
) -> Result<InputSource, InputError> {
    if let Some(path) = file {
        if !path.exists() {
            return Err(InputError::FileNotFound { path });
        }
        return Ok(InputSource::File(path));
    }

    if stdin_piped {
        return Ok(InputSource::Stdin);
    }

    discover()
        .map(InputSource::File)
        .ok_or(InputError::NoInput)
}
