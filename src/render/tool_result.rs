//! Tool result bodies, per tool.
//!
//! Full mode shows the result text (or structured todos); compact mode shows a
//! status token plus a one-line, tool-specific elaboration.

use super::styles::{MessageStyles, Tone};
use super::text::{first_line, first_non_blank_line, truncate_chars, RESULT_MAX_LINES};
use crate::model::{ContentBlock, JsonObject, ResultContent};
use serde_json::Value;

const TODO_WRITE: &str = "TodoWrite";
const TODO_STOCK_MESSAGE: &str = "Todos have been modified successfully";
const MCP_PREFIX: &str = "mcp__";

const COMPACT_LINE_CHARS: usize = 50;
const MCP_CREATED_TITLE_CHARS: usize = 30;
const MCP_GET_CHARS: usize = 40;

/// Tool context resolved through correlation for one result record.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultContext<'a> {
    /// Resolved tool name, empty when unknown.
    pub tool_name: &'a str,
    /// Input of the originating invocation.
    pub tool_input: Option<&'a JsonObject>,
    /// Structured `toolUseResult` data stored beside the message.
    pub tool_use_result: Option<&'a JsonObject>,
}

/// True for tools served through an MCP server.
pub fn is_mcp_tool(name: &str) -> bool {
    name.starts_with(MCP_PREFIX)
}

// ===== Full mode =====

/// Body lines for one `tool_result` block, indented by `indent`.
pub fn full_result_lines(
    is_error: bool,
    content: &ResultContent,
    ctx: &ResultContext<'_>,
    indent: &str,
    styles: &MessageStyles,
) -> Vec<String> {
    let mut lines = Vec::new();

    if is_error {
        lines.push(format!("{}{}", indent, styles.paint(Tone::Error, "[ERROR]")));
    }

    if ctx.tool_name == TODO_WRITE {
        if let Some(tool_use_result) = ctx.tool_use_result {
            lines.extend(todo_result_lines(content, tool_use_result, indent, styles));
            return lines;
        }
    }

    let segments = content.segments();
    if segments.is_empty() {
        lines.push(format!("{}{}", indent, styles.paint(Tone::Muted, "(No content)")));
    }
    for segment in segments {
        lines.extend(truncated_text_lines(segment, indent, RESULT_MAX_LINES, styles));
    }
    lines
}

/// All lines of `text` if there are at most `max + 2`, otherwise the first
/// `max` and a notice with the remaining count.
pub fn truncated_text_lines(
    text: &str,
    indent: &str,
    max: usize,
    styles: &MessageStyles,
) -> Vec<String> {
    let all: Vec<&str> = text.split('\n').collect();
    if all.len() <= max + 2 {
        return all.iter().map(|line| format!("{}{}", indent, line)).collect();
    }

    let mut lines: Vec<String> = all[..max]
        .iter()
        .map(|line| format!("{}{}", indent, line))
        .collect();
    let notice = format!("... ({} more lines)", all.len() - max);
    lines.push(format!("{}{}", indent, styles.paint(Tone::Muted, &notice)));
    lines
}

fn todo_result_lines(
    content: &ResultContent,
    tool_use_result: &JsonObject,
    indent: &str,
    styles: &MessageStyles,
) -> Vec<String> {
    if let Some(todos) = tool_use_result.get("newTodos").and_then(Value::as_array) {
        return todos
            .iter()
            .filter_map(Value::as_object)
            .map(|todo| todo_line(todo, indent, styles))
            .collect();
    }

    match content {
        ResultContent::Text(text) if !text.is_empty() && !text.contains(TODO_STOCK_MESSAGE) => text
            .split('\n')
            .map(|line| format!("{}{}", indent, line))
            .collect(),
        _ => Vec::new(),
    }
}

fn todo_line(todo: &JsonObject, indent: &str, styles: &MessageStyles) -> String {
    let str_field = |key: &str| todo.get(key).and_then(Value::as_str).unwrap_or_default();

    let (icon, tone) = todo_status_icon(str_field("status"));
    let mut line = format!("{}{} {}", indent, styles.paint(tone, icon), str_field("content"));
    match str_field("priority") {
        "high" => {
            line.push(' ');
            line.push_str(&styles.paint(Tone::Error, "[HIGH]"));
        }
        "medium" => {
            line.push(' ');
            line.push_str(&styles.paint(Tone::Active, "[MED]"));
        }
        _ => {}
    }
    line
}

/// Status icon for a todo item.
pub fn todo_status_icon(status: &str) -> (&'static str, Tone) {
    match status {
        "completed" => ("✓", Tone::Done),
        "in_progress" => ("→", Tone::Active),
        "pending" => ("□", Tone::Muted),
        _ => ("•", Tone::Muted),
    }
}

// ===== Compact mode =====

/// Status token and elaboration for a tool result record in compact mode.
///
/// Only the first `tool_result` block is considered.
pub fn compact_result(
    blocks: &[ContentBlock],
    ctx: &ResultContext<'_>,
    styles: &MessageStyles,
) -> String {
    let (is_error, content) = blocks
        .iter()
        .find_map(|block| match block {
            ContentBlock::ToolResult {
                is_error, content, ..
            } => Some((*is_error, content.joined())),
            _ => None,
        })
        .unwrap_or_default();

    let mut out = if is_error {
        styles.paint(Tone::Error, "[ERROR]")
    } else {
        "[OK]".to_string()
    };

    let name = ctx.tool_name;
    match (name, ctx.tool_input) {
        (TODO_WRITE, Some(input)) => {
            out.push(' ');
            out.push_str(&compact_todo(input, styles));
        }
        ("Bash", Some(_)) => out.push_str(&compact_bash(&content)),
        ("Read" | "Grep" | "Glob" | "Write" | "Edit" | "MultiEdit", input) if !is_error => {
            out.push_str(&compact_file_tool(name, &content, input));
        }
        ("WebFetch" | "WebSearch", _) if !is_error && !content.is_empty() => {
            out.push_str(&compact_web_tool(name, &content));
        }
        _ if is_mcp_tool(name) && !is_error && !content.is_empty() => {
            out.push_str(&compact_mcp_tool(name, &content));
        }
        _ => {}
    }
    out
}

/// The in-progress todo, or the first one, with its icon.
fn compact_todo(input: &JsonObject, styles: &MessageStyles) -> String {
    let Some(todos) = input.get("todos").and_then(Value::as_array) else {
        return String::new();
    };
    let objects = || todos.iter().filter_map(Value::as_object);
    let focused = objects()
        .find(|todo| todo.get("status").and_then(Value::as_str) == Some("in_progress"))
        .or_else(|| objects().next());

    let Some(todo) = focused else {
        return String::new();
    };
    let Some(content) = todo.get("content").and_then(Value::as_str) else {
        return String::new();
    };
    let status = todo.get("status").and_then(Value::as_str).unwrap_or_default();
    let (icon, tone) = todo_status_icon(status);
    format!(
        "{} {}",
        styles.paint(tone, icon),
        truncate_chars(content, COMPACT_LINE_CHARS)
    )
}

fn compact_bash(output: &str) -> String {
    let mut out = String::new();
    if let Some(code) = exit_code(output) {
        out.push_str(&format!(" exit {}", code));
    }
    let line = first_line(output);
    if !line.is_empty() {
        out.push_str(&format!(": {}", truncate_chars(line, COMPACT_LINE_CHARS)));
    }
    out
}

/// Exit code from `exit status N` in the output; empty output means success.
pub fn exit_code(output: &str) -> Option<i64> {
    let parsed = output
        .split_once("exit status ")
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .and_then(|word| word.parse().ok());
    match parsed {
        Some(code) => Some(code),
        None if output.is_empty() => Some(0),
        None => None,
    }
}

fn compact_file_tool(name: &str, content: &str, input: Option<&JsonObject>) -> String {
    match name {
        "Read" if !content.is_empty() => format!(" {} lines", content.split('\n').count()),
        "Grep" | "Glob" => {
            let trimmed = content.trim();
            if trimmed.is_empty() {
                return String::new();
            }
            let count = trimmed.split('\n').count();
            if name == "Grep" {
                format!(" {} matches", count)
            } else {
                format!(" {} files found", count)
            }
        }
        "Write" => " file created".to_string(),
        "Edit" => " file updated".to_string(),
        "MultiEdit" => input
            .and_then(|i| i.get("edits"))
            .and_then(Value::as_array)
            .map(|edits| format!(" {} edits applied", edits.len()))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn compact_web_tool(name: &str, content: &str) -> String {
    if name == "WebFetch" {
        return first_non_blank_line(content)
            .map(|line| format!(" {}", truncate_chars(line, COMPACT_LINE_CHARS)))
            .unwrap_or_default();
    }
    match content.matches("<search_result>").count() {
        0 => String::new(),
        n => format!(" {} results", n),
    }
}

fn compact_mcp_tool(name: &str, content: &str) -> String {
    let parts: Vec<&str> = name.split("__").collect();
    let Some(action) = parts.last().filter(|_| parts.len() > 1) else {
        return String::new();
    };

    if action.starts_with("create_") {
        if let Some(id) = scrape_json_string(content, "id") {
            return format!(" Created: {}", id);
        }
        if let Some(title) = scrape_json_string(content, "title") {
            return format!(
                " Created: {}",
                truncate_chars(title, MCP_CREATED_TITLE_CHARS)
            );
        }
    } else if action.starts_with("list_") {
        let count = count_json_items(content);
        if count > 0 {
            return format!(" Found {} items", count);
        }
    } else if action.starts_with("get_") {
        if let Some(found) =
            scrape_json_string(content, "title").or_else(|| scrape_json_string(content, "name"))
        {
            return format!(" {}", truncate_chars(found, MCP_GET_CHARS));
        }
    }
    String::new()
}

/// Best-effort string value of `"key"` in JSON-ish text, without parsing.
///
/// Finds the quoted key, then the next `:"` after it, and returns everything
/// up to the following quote. Empty values count as absent.
pub fn scrape_json_string<'a>(content: &'a str, key: &str) -> Option<&'a str> {
    let quoted = format!("\"{}\"", key);
    let after_key = &content[content.find(&quoted)?..];
    let value_start = after_key.find(":\"")? + 2;
    let value = &after_key[value_start..];
    let value = &value[..value.find('"')?];
    (!value.is_empty()).then_some(value)
}

/// Rough item count of a JSON listing: objects in an array, else `"id":` keys.
pub fn count_json_items(content: &str) -> usize {
    if content.contains("[{") {
        content.matches("},{").count() + 1
    } else {
        content.matches("\"id\":").count()
    }
}
