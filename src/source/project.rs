//! Discovery of the current project's transcript.
//!
//! Claude Code stores transcripts under
//! `<config>/projects/<encoded cwd>/<session>.jsonl`, where the working
//! directory is encoded by replacing `/` and `.` with `-`.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Environment variable naming the Claude config directory explicitly.
pub const CLAUDE_CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

/// Claude config directory.
///
/// 1. `CLAUDE_CONFIG_DIR`
/// 2. `$XDG_CONFIG_HOME/claude`
/// 3. `~/.claude`
pub fn claude_config_dir() -> Option<PathBuf> {
    resolve_config_dir(
        std::env::var_os(CLAUDE_CONFIG_DIR_ENV).map(PathBuf::from),
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        dirs::home_dir(),
    )
}

fn resolve_config_dir(
    explicit: Option<PathBuf>,
    xdg_config: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    let non_empty = |p: &PathBuf| !p.as_os_str().is_empty();
    explicit
        .filter(non_empty)
        .or_else(|| xdg_config.filter(non_empty).map(|p| p.join("claude")))
        .or_else(|| home.filter(non_empty).map(|p| p.join(".claude")))
}

/// Encode a directory path the way Claude Code names project directories.
pub fn encode_directory_path(path: &Path) -> String {
    path.to_string_lossy().replace(['/', '.'], "-")
}

/// Most recently modified non-empty transcript for the current directory.
pub fn find_project_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let config_dir = claude_config_dir()?;
    find_project_file_in(&config_dir, &cwd)
}

/// Most recently modified non-empty `*.jsonl` in `<config_dir>/projects/<encoded cwd>/`.
pub fn find_project_file_in(config_dir: &Path, cwd: &Path) -> Option<PathBuf> {
    let project_dir = config_dir
        .join("projects")
        .join(encode_directory_path(cwd));
    let entries = std::fs::read_dir(&project_dir).ok()?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() || meta.len() == 0 {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if newest.as_ref().is_none_or(|(time, _)| modified > *time) {
            newest = Some((modified, path));
        }
    }

    newest.map(|(_, path)| path)
}
