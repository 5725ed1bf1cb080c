//! Claude Code Log viewer - Entry Point

use ccl::config::{self, CliOverrides, OutputFormat, ResolvedConfig};
use ccl::filter::{FilterConfig, FilterEngine};
use ccl::model::{AppError, PricingConfig};
use ccl::processor::{CancelToken, StreamProcessor};
use ccl::render::{ColorConfig, DisplayMode, MessageStyles, RenderOptions, Renderer};
use ccl::source::{self, InputSource, ProcessingMode};
use clap::Parser;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

/// Display Claude Code project files in a human-readable format
#[derive(Parser, Debug)]
#[command(name = "ccl")]
#[command(version)]
#[command(about = "Display Claude Code JSONL transcripts in a human-readable format")]
#[command(after_help = "\
Examples:
  ccl                          Current project's latest transcript
  ccl session.jsonl --compact  One line per record
  ccl --role user,assistant    Only user and assistant messages
  ccl --tool 'Bash,*Edit'      Tool calls matching the globs
  ccl --json | jq .            Filtered records as JSON
  ccl -f                       Follow the transcript as it grows")]
pub struct Args {
    /// Path to JSONL transcript (defaults to piped stdin, then the current project)
    pub file: Option<PathBuf>,

    /// Path to JSONL transcript (same as FILE)
    #[arg(short = 'p', long = "project", value_name = "FILE", conflicts_with = "file")]
    pub project: Option<PathBuf>,

    /// Disable color output
    #[arg(long)]
    pub no_color: bool,

    /// Compact output, one line per record
    #[arg(long)]
    pub compact: bool,

    /// Filter by role (user,assistant,tool)
    #[arg(long, value_name = "LIST")]
    pub role: Option<String>,

    /// Filter by tool name, glob patterns allowed (Bash,*Edit,Todo*)
    #[arg(long, value_name = "LIST")]
    pub tool: Option<String>,

    /// Show all tool calls (same as --tool '*')
    #[arg(long)]
    pub tools: bool,

    /// Exclude tools by name, glob patterns allowed
    #[arg(long, value_name = "LIST")]
    pub tool_exclude: Option<String>,

    /// Show estimated token cost on assistant messages
    #[arg(long)]
    pub cost: bool,

    /// Show time elapsed between messages
    #[arg(long)]
    pub timing: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Shortcut for --format json
    #[arg(long)]
    pub json: bool,

    /// Shortcut for --format text
    #[arg(long)]
    pub text: bool,

    /// Follow the file for new content (like tail -f)
    #[arg(short, long)]
    pub follow: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Format requested on the command line. `--json` beats `--text`,
    /// and both beat `--format`.
    fn format_override(&self) -> Option<OutputFormat> {
        if self.json {
            Some(OutputFormat::Json)
        } else if self.text {
            Some(OutputFormat::Text)
        } else {
            self.format
        }
    }

    fn cli_overrides(&self) -> CliOverrides {
        let flag = |set: bool| set.then_some(true);
        CliOverrides {
            compact: flag(self.compact),
            no_color: flag(self.no_color),
            timing: flag(self.timing),
            cost: flag(self.cost),
            format: self.format_override(),
        }
    }

    fn filter_config(&self) -> FilterConfig {
        let tool = if self.tools {
            "*"
        } else {
            self.tool.as_deref().unwrap_or_default()
        };
        FilterConfig::from_lists(
            self.role.as_deref().unwrap_or_default(),
            tool,
            self.tool_exclude.as_deref().unwrap_or_default(),
        )
    }

    fn input_file(&self) -> Option<PathBuf> {
        self.project.clone().or_else(|| self.file.clone())
    }
}

fn resolve_config(args: &Args) -> Result<ResolvedConfig, AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config_file = config::load_config_with_precedence(args.config.clone())?;
    let merged = config::merge_config(config_file);
    let with_env = config::apply_env_overrides(merged);
    Ok(config::apply_cli_overrides(with_env, args.cli_overrides()))
}

fn display_mode(config: &ResolvedConfig) -> DisplayMode {
    match (config.format, config.compact) {
        (OutputFormat::Json, _) => DisplayMode::Json,
        (OutputFormat::Text, true) => DisplayMode::Compact,
        (OutputFormat::Text, false) => DisplayMode::Full,
    }
}

fn build_renderer(config: &ResolvedConfig) -> Renderer {
    let mode = display_mode(config);
    // JSON output never carries escape sequences.
    let no_color = config.no_color || mode == DisplayMode::Json;
    let styles = MessageStyles::with_color_config(ColorConfig::from_env_and_args(no_color));
    let pricing = config
        .pricing
        .clone()
        .map(PricingConfig::from)
        .unwrap_or_default();

    Renderer::new(
        RenderOptions {
            mode,
            show_timing: config.timing,
            show_cost: config.cost,
        },
        styles,
        pricing,
    )
}

fn run(args: Args) -> Result<(), AppError> {
    let config = resolve_config(&args)?;

    ccl::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let input = source::detect_input_source(args.input_file())?;
    let mode = input.mode(args.follow)?;
    let filter = FilterEngine::new(args.filter_config());
    info!(?input, ?mode, filter = ?filter.config(), "starting");

    let stdout = io::stdout().lock();
    let mut processor =
        StreamProcessor::new(stdout, filter, build_renderer(&config), config.max_line_bytes);

    match (input, mode) {
        (InputSource::Stdin, _) => processor.run_streaming(io::stdin().lock()),
        (InputSource::File(path), ProcessingMode::Follow) => {
            let cancel = CancelToken::new();
            let handler_token = cancel.clone();
            if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
                warn!(error = %e, "could not install Ctrl-C handler");
            }
            processor.run_follow(&path, &cancel, config.poll_interval())
        }
        (InputSource::File(path), _) => {
            let file = std::fs::File::open(&path).map_err(ccl::model::InputError::Io)?;
            processor.run_buffered(BufReader::new(file))
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_broken_pipe() => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
