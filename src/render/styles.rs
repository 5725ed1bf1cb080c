//! Terminal color styling.
//!
//! Distinct colors per role and marker, applied through crossterm. When colors
//! are disabled no escape sequences are emitted at all.

use crossterm::style::{StyledContent, Stylize};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// Priority (first match wins):
    /// 1. `--no-color` flag (disables colors)
    /// 2. `NO_COLOR` env var (any value disables colors)
    /// 3. Default: colors enabled
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var_os("NO_COLOR").is_none();
        Self { enabled }
    }

    /// Colors explicitly on or off.
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== Tone =====

/// Semantic color slot for a fragment of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Timestamps, versions, ids and other metadata.
    Muted,
    /// `USER` label.
    User,
    /// `ASSISTANT` label.
    Assistant,
    /// `TOOL` label.
    Tool,
    /// `[Tool Use]` marker.
    ToolUse,
    /// `[COMMAND]` marker.
    Command,
    /// `[ERROR]` marker and high-priority tags.
    Error,
    /// `(MCP)` label.
    Mcp,
    /// Completed todo icon.
    Done,
    /// In-progress todo icon and medium-priority tags.
    Active,
}

impl Tone {
    fn apply(self, text: &str) -> StyledContent<&str> {
        match self {
            Tone::Muted => text.dark_grey(),
            Tone::User => text.blue().bold(),
            Tone::Assistant => text.green().bold(),
            Tone::Tool => text.cyan().bold(),
            Tone::ToolUse => text.yellow(),
            Tone::Command => text.magenta(),
            Tone::Error => text.red(),
            Tone::Mcp => text.cyan(),
            Tone::Done => text.green(),
            Tone::Active => text.yellow(),
        }
    }
}

// ===== MessageStyles =====

/// Applies [`Tone`]s to text according to a [`ColorConfig`].
#[derive(Debug, Clone, Copy)]
pub struct MessageStyles {
    config: ColorConfig,
}

impl MessageStyles {
    /// Create a new MessageStyles with specified color configuration.
    pub fn with_color_config(config: ColorConfig) -> Self {
        Self { config }
    }

    /// Styles that never emit escape sequences.
    pub fn plain() -> Self {
        Self::with_color_config(ColorConfig::new(false))
    }

    /// `text` wrapped in the escape sequences for `tone`, or verbatim.
    pub fn paint(&self, tone: Tone, text: &str) -> String {
        if self.config.colors_enabled() {
            tone.apply(text).to_string()
        } else {
            text.to_string()
        }
    }
}

// ===== Tests =====
