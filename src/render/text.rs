//! String helpers shared by the full and compact layouts.

use crate::model::{ContentBlock, JsonObject};
use serde_json::Value;

/// Body lines of results are shown in full up to this many lines (plus slack).
pub const RESULT_MAX_LINES: usize = 10;

const SUMMARY_TEXT_CHARS: usize = 60;
const SUMMARY_COMMAND_CHARS: usize = 40;
const SUMMARY_RESULT_CHARS: usize = 40;
const INPUT_MULTILINE_CHARS: usize = 60;
const INPUT_LONG_BYTES: usize = 100;
const INPUT_LONG_CHARS: usize = 80;

/// First `max` chars of `s`, with `...` appended if anything was cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

/// First line of `s`, trimmed.
pub fn first_line(s: &str) -> &str {
    s.split('\n').next().unwrap_or_default().trim()
}

/// First line of `s` that is non-empty after trimming.
pub fn first_non_blank_line(s: &str) -> Option<&str> {
    s.split('\n').map(str::trim).find(|line| !line.is_empty())
}

// ===== Tool input values =====

/// Keys whose string values are file paths and are never shortened.
pub fn is_path_key(key: &str) -> bool {
    key == "file_path" || key == "path" || key.ends_with("_path")
}

/// One-line rendering of a tool input value.
pub fn format_input_value(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) if is_path_key(key) => s.clone(),
        Value::String(s) => format_string_value(s),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(map) => format!("{{{} keys}}", map.len()),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
    }
}

/// Multi-line strings collapse to their first line with a line count; long
/// single-line strings are cut.
fn format_string_value(s: &str) -> String {
    if s.contains('\n') {
        let more = s.split('\n').count() - 1;
        return format!(
            "{}... ({} more lines)",
            truncate_chars(first_line(s), INPUT_MULTILINE_CHARS),
            more
        );
    }
    if s.len() > INPUT_LONG_BYTES {
        return truncate_chars(s, INPUT_LONG_CHARS);
    }
    s.to_string()
}

// ===== Compact summary =====

/// One-line summary of a message's blocks for compact mode.
///
/// Parts are joined with a single space; blocks with nothing to say are
/// skipped.
pub fn summarize_blocks(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(summarize_block)
        .collect::<Vec<_>>()
        .join(" ")
}

fn summarize_block(block: &ContentBlock) -> Option<String> {
    match block {
        ContentBlock::Text { text } => first_non_blank_line(text)
            .map(|line| truncate_chars(line, SUMMARY_TEXT_CHARS)),
        ContentBlock::ToolUse {
            name: Some(name),
            input,
            ..
        } => Some(summarize_tool_use(name, input.as_ref())),
        ContentBlock::ToolUse { name: None, .. } => None,
        ContentBlock::ToolResult { content, .. } => {
            let joined = content.joined();
            let line = first_line(&joined);
            Some(if line.is_empty() {
                "[Tool Result]".to_string()
            } else {
                format!("[Result: {}]", truncate_chars(line, SUMMARY_RESULT_CHARS))
            })
        }
        ContentBlock::Unknown { .. } => None,
    }
}

fn summarize_tool_use(name: &str, input: Option<&JsonObject>) -> String {
    let field = |key: &str| input.and_then(|i| i.get(key)).and_then(Value::as_str);

    if name == "Bash" {
        if let Some(command) = field("command") {
            let command = command.replace('\n', " ");
            return format!(
                "[Tool: Bash] {}",
                truncate_chars(command.trim(), SUMMARY_COMMAND_CHARS)
            );
        }
    } else if let Some(path) = field("file_path") {
        return format!("[Tool: {}] {}", name, path);
    }
    format!("[Tool: {}]", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResultContent;
    use serde_json::json;

    fn tool_use(name: &str, input: Value) -> ContentBlock {
        ContentBlock::ToolUse {
            id: Some("t".to_string()),
            name: Some(name.to_string()),
            input: input.as_object().cloned(),
        }
    }

    fn text(s: &str) -> ContentBlock {
        ContentBlock::Text {
            text: s.to_string(),
        }
    }

    #[test]
    fn truncate_chars_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello!", 5), "hello...");
        assert_eq!(truncate_chars("héllo wörld", 4), "héll...");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn path_keys_are_recognized() {
        assert!(is_path_key("file_path"));
        assert!(is_path_key("path"));
        assert!(is_path_key("notebook_path"));
        assert!(!is_path_key("pattern"));
    }

    #[test]
    fn input_values_format_by_type() {
        assert_eq!(format_input_value("command", &json!("ls -la")), "ls -la");
        assert_eq!(format_input_value("todos", &json!([1, 2, 3])), "[3 items]");
        assert_eq!(format_input_value("opts", &json!({"a": 1, "b": 2})), "{2 keys}");
        assert_eq!(format_input_value("replace_all", &json!(true)), "true");
        assert_eq!(format_input_value("limit", &json!(20)), "20");
        assert_eq!(format_input_value("offset", &Value::Null), "null");
    }

    #[test]
    fn multiline_strings_show_first_line_and_count() {
        assert_eq!(
            format_input_value("content", &json!("  first  \nsecond\nthird")),
            "first... (2 more lines)"
        );
    }

    #[test]
    fn long_strings_are_truncated_but_paths_are_not() {
        let long = "x".repeat(120);
        let formatted = format_input_value("description", &json!(long));
        assert_eq!(formatted.chars().count(), 83);
        assert!(formatted.ends_with("..."));

        let long_path = format!("/{}", "d/".repeat(70));
        assert_eq!(format_input_value("file_path", &json!(long_path)), long_path);
    }

    #[test]
    fn summary_uses_first_non_blank_text_line() {
        let blocks = vec![text("\n  Let me check that.  \nMore")];
        assert_eq!(summarize_blocks(&blocks), "Let me check that.");
    }

    #[test]
    fn summary_truncates_text_to_sixty_chars() {
        let blocks = vec![text(&"a".repeat(70))];
        assert_eq!(summarize_blocks(&blocks), format!("{}...", "a".repeat(60)));
    }

    #[test]
    fn summary_describes_tool_uses() {
        let blocks = vec![
            text("Running"),
            tool_use("Bash", json!({"command": "cargo\ntest --all"})),
            tool_use("Read", json!({"file_path": "/src/lib.rs"})),
            tool_use("Grep", json!({"pattern": "foo"})),
        ];
        assert_eq!(
            summarize_blocks(&blocks),
            "Running [Tool: Bash] cargo test --all [Tool: Read] /src/lib.rs [Tool: Grep]"
        );
    }

    #[test]
    fn summary_describes_tool_results() {
        let blocks = vec![
            ContentBlock::ToolResult {
                tool_use_id: None,
                is_error: false,
                content: ResultContent::Text("ok\nmore".to_string()),
            },
            ContentBlock::ToolResult {
                tool_use_id: None,
                is_error: false,
                content: ResultContent::Missing,
            },
        ];
        assert_eq!(summarize_blocks(&blocks), "[Result: ok] [Tool Result]");
    }

    #[test]
    fn summary_skips_blocks_without_content() {
        let blocks = vec![
            text("   "),
            ContentBlock::Unknown {
                block_type: "thinking".to_string(),
            },
        ];
        assert_eq!(summarize_blocks(&blocks), "");
    }
}
