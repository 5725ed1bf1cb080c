//! Record rendering: full text, compact text, and JSON passthrough.
//!
//! Each accepted record is formatted into one buffer and written to the sink
//! in a single call. The elapsed-time cursor is owned by the caller and passed
//! in, so records that are filtered out never touch it.

pub mod styles;
pub mod text;
pub mod timing;
pub mod tool_result;

use crate::correlation::ToolCorrelationTable;
use crate::model::{ContentBlock, JsonObject, PricingConfig, Record, Role};
use std::io::{self, Write};

pub use styles::{ColorConfig, MessageStyles, Tone};
pub use timing::TimingCursor;
use tool_result::{compact_result, full_result_lines, is_mcp_tool, ResultContext};

const BODY_INDENT: &str = "  ";
const INPUT_INDENT: &str = "    ";

// ===== DisplayMode =====

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Multi-line rendering with headers and bodies.
    #[default]
    Full,
    /// One summary line per record.
    Compact,
    /// Original record re-serialized, one JSON document per line.
    Json,
}

/// Renderer settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Layout to produce.
    pub mode: DisplayMode,
    /// Append elapsed time since the previous rendered record.
    pub show_timing: bool,
    /// Append estimated cost to assistant usage summaries.
    pub show_cost: bool,
}

// ===== Renderer =====

/// Formats accepted records for display.
#[derive(Debug, Clone)]
pub struct Renderer {
    options: RenderOptions,
    styles: MessageStyles,
    pricing: PricingConfig,
}

impl Renderer {
    /// Create a renderer.
    pub fn new(options: RenderOptions, styles: MessageStyles, pricing: PricingConfig) -> Self {
        Self {
            options,
            styles,
            pricing,
        }
    }

    /// Active options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render one record to `out`.
    ///
    /// Text modes advance `cursor` for every record passed in, including
    /// record types that produce no text.
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        record: &Record,
        table: &ToolCorrelationTable,
        cursor: &mut TimingCursor,
    ) -> io::Result<()> {
        if self.options.mode == DisplayMode::Json {
            let line = serde_json::to_string(record.raw())?;
            return writeln!(out, "{}", line);
        }

        let time = cursor.stamp(record.timestamp(), self.options.show_timing);
        let rendered = match self.options.mode {
            DisplayMode::Compact => self.compact(record, table, &time),
            _ => self.full(record, table, &time),
        };
        match rendered {
            Some(text) => out.write_all(text.as_bytes()),
            None => Ok(()),
        }
    }

    // ===== Full layout =====

    fn full(&self, record: &Record, table: &ToolCorrelationTable, time: &str) -> Option<String> {
        record.message()?;

        let (label, tone) = role_label(record.role())?;
        let mut header = format!(
            "{}{} {}",
            self.styles.paint(Tone::Muted, &format!("[{}]", time)),
            self.version_suffix(record),
            self.styles.paint(tone, label)
        );

        let ctx = match record.role() {
            Role::Assistant => {
                header.push_str(&self.assistant_details(record));
                ResultContext::default()
            }
            Role::User => {
                if is_slash_command(record.blocks()) {
                    header.push(' ');
                    header.push_str(&self.styles.paint(Tone::Command, "[COMMAND]"));
                }
                ResultContext::default()
            }
            Role::ToolResult => {
                let ctx = result_context(record, table);
                if !ctx.tool_name.is_empty() {
                    header.push(' ');
                    header.push_str(
                        &self
                            .styles
                            .paint(Tone::Muted, &format!("({})", ctx.tool_name)),
                    );
                }
                ctx
            }
            Role::Other(_) => return None,
        };

        let mut lines = vec![header];
        for block in record.blocks() {
            self.block_lines(block, &ctx, &mut lines);
        }

        let mut text = lines.join("\n");
        text.push_str("\n\n");
        Some(text)
    }

    fn version_suffix(&self, record: &Record) -> String {
        record
            .version()
            .map(|v| format!(" {}", self.styles.paint(Tone::Muted, &format!("v{}", v))))
            .unwrap_or_default()
    }

    /// ` (model)` and the bracketed token usage summary.
    fn assistant_details(&self, record: &Record) -> String {
        let mut details = String::new();
        let model = record.model();
        if let Some(model) = model {
            details.push(' ');
            details.push_str(&self.styles.paint(Tone::Muted, &format!("({})", model)));
        }

        let Some(usage) = record.usage() else {
            return details;
        };
        details.push_str(&format!(" [↑{} ↓{}", usage.input_tokens, usage.output_tokens));
        if usage.cache_read_input_tokens > 0 {
            details.push_str(&format!(" *{}", usage.cache_read_input_tokens));
        }
        if usage.cache_creation_input_tokens > 0 {
            details.push_str(&format!(" +{}", usage.cache_creation_input_tokens));
        }
        if self.options.show_cost {
            if let Some(cost) = model.and_then(|m| self.pricing.cost(&usage, m)) {
                details.push_str(&format!(" ${:.4}", cost));
            }
        }
        details.push(']');
        details
    }

    fn block_lines(&self, block: &ContentBlock, ctx: &ResultContext<'_>, lines: &mut Vec<String>) {
        match block {
            ContentBlock::Text { text } => {
                lines.extend(text.split('\n').map(|line| format!("{}{}", BODY_INDENT, line)));
            }
            ContentBlock::ToolUse { id, name, input } => {
                lines.push(self.tool_use_header(id.as_deref(), name.as_deref()));
                if let Some(input) = input {
                    lines.extend(self.input_lines(input));
                }
            }
            ContentBlock::ToolResult {
                is_error, content, ..
            } => {
                lines.extend(full_result_lines(
                    *is_error,
                    content,
                    ctx,
                    BODY_INDENT,
                    &self.styles,
                ));
            }
            ContentBlock::Unknown { .. } => {}
        }
    }

    fn tool_use_header(&self, id: Option<&str>, name: Option<&str>) -> String {
        let mut line = format!("{}{}", BODY_INDENT, self.styles.paint(Tone::ToolUse, "[Tool Use]"));
        if let Some(name) = name {
            line.push(' ');
            line.push_str(name);
            if is_mcp_tool(name) {
                line.push(' ');
                line.push_str(&self.styles.paint(Tone::Mcp, "(MCP)"));
            }
        }
        if let Some(id) = id {
            line.push(' ');
            line.push_str(&self.styles.paint(Tone::Muted, &format!("(ID: {})", id)));
        }
        line
    }

    /// `key: value` per input entry, in key order.
    fn input_lines<'a>(&'a self, input: &'a JsonObject) -> impl Iterator<Item = String> + 'a {
        input.iter().map(move |(key, value)| {
            format!(
                "{}{} {}",
                INPUT_INDENT,
                self.styles.paint(Tone::Muted, &format!("{}:", key)),
                text::format_input_value(key, value)
            )
        })
    }

    // ===== Compact layout =====

    fn compact(&self, record: &Record, table: &ToolCorrelationTable, time: &str) -> Option<String> {
        record.message()?;

        let (label, tone) = role_label(record.role())?;
        let summary = match record.role() {
            Role::ToolResult => compact_result(
                record.blocks(),
                &result_context(record, table),
                &self.styles,
            ),
            _ => text::summarize_blocks(record.blocks()),
        };

        Some(format!(
            "{} {} - {}\n",
            self.styles.paint(Tone::Muted, &format!("[{}]", time)),
            self.styles.paint(tone, &format!("{:<9}", label)),
            summary
        ))
    }
}

fn role_label(role: &Role) -> Option<(&'static str, Tone)> {
    match role {
        Role::Assistant => Some(("ASSISTANT", Tone::Assistant)),
        Role::User => Some(("USER", Tone::User)),
        Role::ToolResult => Some(("TOOL", Tone::Tool)),
        Role::Other(_) => None,
    }
}

/// Slash commands arrive as text wrapped in `<command-name>` tags. Only the
/// first text block is inspected.
fn is_slash_command(blocks: &[ContentBlock]) -> bool {
    blocks
        .iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        })
        .is_some_and(|text| text.contains("<command-name>") && text.contains("</command-name>"))
}

fn result_context<'a>(record: &'a Record, table: &'a ToolCorrelationTable) -> ResultContext<'a> {
    let id = record.first_tool_result_id();
    ResultContext {
        tool_name: id.map(|id| table.lookup_name(id)).unwrap_or_default(),
        tool_input: id.and_then(|id| table.lookup_input(id)),
        tool_use_result: record.tool_use_result(),
    }
}
