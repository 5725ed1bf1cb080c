//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::source::DEFAULT_MAX_LINE_BYTES;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CCL_CONFIG";

/// Environment variable overriding the output format.
pub const FORMAT_ENV: &str = "CCL_FORMAT";

/// Default follow-mode poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// Output format selected by `--format`, `CCL_FORMAT` or the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text (full or compact).
    #[default]
    Text,
    /// One JSON object per accepted record.
    Json,
}

impl OutputFormat {
    /// Parse a format name case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/ccl/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Compact one-line-per-record output.
    #[serde(default)]
    pub compact: Option<bool>,

    /// Disable colors.
    #[serde(default)]
    pub no_color: Option<bool>,

    /// Show elapsed time between records.
    #[serde(default)]
    pub timing: Option<bool>,

    /// Show estimated cost on assistant records.
    #[serde(default)]
    pub cost: Option<bool>,

    /// Output format.
    #[serde(default)]
    pub format: Option<OutputFormat>,

    /// Longest accepted input line in bytes.
    #[serde(default)]
    pub max_line_bytes: Option<usize>,

    /// Follow-mode poll interval in milliseconds.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Pricing section for cost estimation.
    #[serde(default)]
    pub pricing: Option<PricingConfigSection>,
}

/// Pricing configuration section from TOML.
///
/// ```toml
/// [pricing.models.opus]
/// input = 15.0
/// output = 75.0
/// cached_input = 1.5
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PricingConfigSection {
    /// Per-model pricing entries (e.g., "opus", "sonnet", "haiku").
    #[serde(default)]
    pub models: HashMap<String, PricingEntry>,

    /// Default pricing for unknown models.
    #[serde(default)]
    pub default: Option<PricingEntry>,
}

/// Pricing entry for a specific model.
///
/// All costs are per million tokens in USD.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PricingEntry {
    /// Cost per million input tokens.
    pub input: f64,

    /// Cost per million output tokens.
    pub output: f64,

    /// Cost per million cached input tokens.
    #[serde(default)]
    pub cached_input: Option<f64>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Compact output.
    pub compact: bool,
    /// Colors disabled by configuration.
    pub no_color: bool,
    /// Elapsed-time annotations.
    pub timing: bool,
    /// Cost annotations.
    pub cost: bool,
    /// Output format.
    pub format: OutputFormat,
    /// Longest accepted input line.
    pub max_line_bytes: usize,
    /// Follow-mode poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Pricing overrides from the config file.
    pub pricing: Option<PricingConfigSection>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            compact: false,
            no_color: false,
            timing: false,
            cost: false,
            format: OutputFormat::Text,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            log_file_path: default_log_path(),
            pricing: None,
        }
    }
}

impl ResolvedConfig {
    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// CLI flags that override configuration. `None` leaves the value alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--compact`
    pub compact: Option<bool>,
    /// `--no-color`
    pub no_color: Option<bool>,
    /// `--timing`
    pub timing: Option<bool>,
    /// `--cost`
    pub cost: Option<bool>,
    /// `--format`, `--json`, `--text`
    pub format: Option<OutputFormat>,
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/ccl/ccl.log` on Linux or the platform equivalent.
/// If the state directory cannot be determined, falls back to the current
/// directory.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("ccl").join("ccl.log"),
        None => PathBuf::from("ccl.log"),
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/ccl/config.toml` on Linux, the platform equivalent
/// elsewhere, or `None` if no config directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ccl").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CCL_CONFIG` environment variable
/// 3. Default path `~/.config/ccl/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Some(env_path) = std::env::var_os(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        compact: config.compact.unwrap_or(defaults.compact),
        no_color: config.no_color.unwrap_or(defaults.no_color),
        timing: config.timing.unwrap_or(defaults.timing),
        cost: config.cost.unwrap_or(defaults.cost),
        format: config.format.unwrap_or(defaults.format),
        max_line_bytes: config
            .max_line_bytes
            .filter(|&n| n > 0)
            .unwrap_or(defaults.max_line_bytes),
        poll_interval_ms: config
            .poll_interval_ms
            .filter(|&ms| ms > 0)
            .unwrap_or(defaults.poll_interval_ms),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        pricing: config.pricing,
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `CCL_FORMAT`: `text` or `json`; unrecognised values are ignored
pub fn apply_env_overrides(config: ResolvedConfig) -> ResolvedConfig {
    let format = std::env::var(FORMAT_ENV).ok();
    apply_format_override(config, format.as_deref())
}

fn apply_format_override(mut config: ResolvedConfig, format: Option<&str>) -> ResolvedConfig {
    if let Some(raw) = format {
        match OutputFormat::parse(raw) {
            Some(format) => config.format = format,
            None => warn!(value = raw, "ignoring unrecognised {}", FORMAT_ENV),
        }
    }
    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only flags the user actually passed are applied.
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(compact) = cli.compact {
        config.compact = compact;
    }
    if let Some(no_color) = cli.no_color {
        config.no_color = no_color;
    }
    if let Some(timing) = cli.timing {
        config.timing = timing;
    }
    if let Some(cost) = cli.cost {
        config.cost = cost;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
