//! Content blocks within a transcript message.
//!
//! A message's `content` is either a bare string or an array of typed blocks.
//! [`extract`] normalizes both shapes into a sequence of [`ContentBlock`]s and
//! is the only place that dispatches on the block `type` string. Everything
//! downstream works with the closed variant set.

use serde_json::{Map, Value};

const BLOCK_TEXT: &str = "text";
const BLOCK_TOOL_USE: &str = "tool_use";
const BLOCK_TOOL_RESULT: &str = "tool_result";

/// A JSON object as decoded from the transcript.
pub type JsonObject = Map<String, Value>;

// ===== ContentBlock =====

/// One normalized unit of message content.
///
/// Decoding never fails: fields that are missing or of the wrong type become
/// `None` (or an empty default), and blocks that cannot be understood at all
/// become [`ContentBlock::Unknown`].
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// Plain text (also produced for string-valued `content`).
    Text {
        /// Text verbatim, embedded newlines included.
        text: String,
    },
    /// A tool invocation issued by the assistant.
    ToolUse {
        /// Correlation id assigned by the producer.
        id: Option<String>,
        /// Tool name, e.g. `Bash` or `mcp__github__create_issue`.
        name: Option<String>,
        /// Tool input, when it is a JSON object.
        input: Option<JsonObject>,
    },
    /// The result of a tool invocation, embedded in a `user` record.
    ToolResult {
        /// Id of the `tool_use` block this result answers.
        tool_use_id: Option<String>,
        /// Whether the tool reported failure.
        is_error: bool,
        /// Result payload.
        content: ResultContent,
    },
    /// Any other block (`thinking`, `image`, or a malformed known type).
    Unknown {
        /// The block's `type` string, empty when absent.
        block_type: String,
    },
}

impl ContentBlock {
    /// Decode one array element. Non-objects yield `None` and are dropped.
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let block_type = obj.get("type").and_then(Value::as_str).unwrap_or_default();

        let block = match block_type {
            BLOCK_TEXT => match obj.get("text").and_then(Value::as_str) {
                Some(text) => ContentBlock::Text {
                    text: text.to_string(),
                },
                None => ContentBlock::Unknown {
                    block_type: block_type.to_string(),
                },
            },
            BLOCK_TOOL_USE => ContentBlock::ToolUse {
                id: string_field(obj, "id"),
                name: string_field(obj, "name"),
                input: obj.get("input").and_then(Value::as_object).cloned(),
            },
            BLOCK_TOOL_RESULT => ContentBlock::ToolResult {
                tool_use_id: string_field(obj, "tool_use_id"),
                is_error: obj
                    .get("is_error")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                content: ResultContent::from_value(obj.get("content")),
            },
            other => ContentBlock::Unknown {
                block_type: other.to_string(),
            },
        };

        Some(block)
    }

    /// True for `tool_result` blocks.
    pub fn is_tool_result(&self) -> bool {
        matches!(self, ContentBlock::ToolResult { .. })
    }
}

// ===== ResultContent =====

/// Payload of a `tool_result` block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultContent {
    /// `content` was a string.
    Text(String),
    /// `content` was an array; holds the `text` of each text item in order.
    Blocks(Vec<String>),
    /// `content` was absent or of another shape.
    #[default]
    Missing,
}

impl ResultContent {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => ResultContent::Text(s.clone()),
            Some(Value::Array(items)) => ResultContent::Blocks(
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .filter(|item| item.get("type").and_then(Value::as_str) == Some(BLOCK_TEXT))
                    .filter_map(|item| item.get("text").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect(),
            ),
            _ => ResultContent::Missing,
        }
    }

    /// All text of the result as one string (array items joined by newlines).
    pub fn joined(&self) -> String {
        match self {
            ResultContent::Text(s) => s.clone(),
            ResultContent::Blocks(parts) => parts.join("\n"),
            ResultContent::Missing => String::new(),
        }
    }

    /// Non-empty text segments, in display order.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            ResultContent::Text(s) if !s.is_empty() => vec![s.as_str()],
            ResultContent::Blocks(parts) => parts
                .iter()
                .map(String::as_str)
                .filter(|s| !s.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}

// ===== Extraction =====

/// Normalize `message.content` into an ordered sequence of blocks.
///
/// - string content becomes a single [`ContentBlock::Text`]
/// - array content maps each object element to a block, dropping non-objects
/// - anything else (including a missing message) yields an empty sequence
pub fn extract(message: Option<&JsonObject>) -> Vec<ContentBlock> {
    match message.and_then(|m| m.get("content")) {
        Some(Value::String(text)) => vec![ContentBlock::Text { text: text.clone() }],
        Some(Value::Array(items)) => items.iter().filter_map(ContentBlock::from_value).collect(),
        _ => Vec::new(),
    }
}

fn string_field(obj: &JsonObject, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}
