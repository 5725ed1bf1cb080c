//! Decoded transcript records.
//!
//! A [`Record`] keeps the original decoded JSON object (so JSON output can
//! re-emit it untouched) together with the content blocks extracted from its
//! `message`, decoded once at the boundary.

use crate::model::content::{extract, ContentBlock, JsonObject};
use crate::model::usage::TokenUsage;
use serde_json::Value;

// Record type discriminants
const TYPE_USER: &str = "user";
const TYPE_ASSISTANT: &str = "assistant";

// ===== Role =====

/// Effective role of a record, used by both filtering and rendering.
///
/// There is no `tool` discriminant on the wire: tool results arrive inside
/// `user` records and are classified as [`Role::ToolResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// `assistant` record.
    Assistant,
    /// `user` record without any `tool_result` block.
    User,
    /// `user` record carrying at least one `tool_result` block.
    ToolResult,
    /// Any other record type, holding the literal `type` string.
    Other(String),
}

impl Role {
    /// Name matched against the role allow-list.
    pub fn filter_name(&self) -> &str {
        match self {
            Role::Assistant => "assistant",
            Role::User => "user",
            Role::ToolResult => "tool",
            Role::Other(name) => name,
        }
    }
}

// ===== Record =====

/// One decoded transcript line.
#[derive(Debug, Clone)]
pub struct Record {
    raw: JsonObject,
    blocks: Vec<ContentBlock>,
    role: Role,
}

impl Record {
    /// Decode one line. Returns `None` for anything that is not a JSON object.
    pub fn decode(line: &[u8]) -> Option<Self> {
        match serde_json::from_slice::<Value>(line).ok()? {
            Value::Object(raw) => Some(Self::from_object(raw)),
            _ => None,
        }
    }

    /// Build a record from an already-decoded object.
    pub fn from_object(raw: JsonObject) -> Self {
        let blocks = extract(raw.get("message").and_then(Value::as_object));
        let record_type = raw.get("type").and_then(Value::as_str).unwrap_or_default();

        let role = match record_type {
            TYPE_ASSISTANT => Role::Assistant,
            TYPE_USER if blocks.iter().any(ContentBlock::is_tool_result) => Role::ToolResult,
            TYPE_USER => Role::User,
            other => Role::Other(other.to_string()),
        };

        Self { raw, blocks, role }
    }

    /// The original decoded object, untouched.
    pub fn raw(&self) -> &JsonObject {
        &self.raw
    }

    /// Effective role.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Raw `timestamp` string.
    pub fn timestamp(&self) -> Option<&str> {
        self.str_field("timestamp")
    }

    /// Producer version string.
    pub fn version(&self) -> Option<&str> {
        self.str_field("version").filter(|v| !v.is_empty())
    }

    /// The nested `message` object, if it is an object.
    pub fn message(&self) -> Option<&JsonObject> {
        self.raw.get("message").and_then(Value::as_object)
    }

    /// Structured tool result data stored beside the message.
    pub fn tool_use_result(&self) -> Option<&JsonObject> {
        self.raw.get("toolUseResult").and_then(Value::as_object)
    }

    /// Content blocks extracted from `message.content`.
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Model name reported on assistant messages.
    pub fn model(&self) -> Option<&str> {
        self.message()
            .and_then(|m| m.get("model"))
            .and_then(Value::as_str)
    }

    /// Token usage reported on assistant messages.
    pub fn usage(&self) -> Option<TokenUsage> {
        self.message()
            .and_then(|m| m.get("usage"))
            .and_then(Value::as_object)
            .and_then(TokenUsage::from_json)
    }

    /// `(id, name)` of every `tool_use` block, in order. Missing fields yield `None`.
    pub fn tool_uses(&self) -> impl Iterator<Item = (Option<&str>, Option<&str>)> {
        self.blocks.iter().filter_map(|block| match block {
            ContentBlock::ToolUse { id, name, .. } => Some((id.as_deref(), name.as_deref())),
            _ => None,
        })
    }

    /// Id referenced by the first `tool_result` block.
    pub fn first_tool_result_id(&self) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.as_deref()),
            _ => None,
        })?
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(line: &str) -> Record {
        Record::decode(line.as_bytes()).expect("line should decode")
    }

    #[test]
    fn decode_rejects_malformed_and_non_object_lines() {
        assert!(Record::decode(b"{\"type\":").is_none());
        assert!(Record::decode(b"").is_none());
        assert!(Record::decode(b"[1,2,3]").is_none());
        assert!(Record::decode(b"\"just a string\"").is_none());
    }

    #[test]
    fn classifies_assistant_records() {
        let record = decode(r#"{"type":"assistant","message":{"content":"hi"}}"#);
        assert_eq!(record.role(), &Role::Assistant);
        assert_eq!(record.role().filter_name(), "assistant");
    }

    #[test]
    fn user_with_tool_result_is_classified_as_tool() {
        let record = decode(
            r#"{"type":"user","message":{"content":[{"type":"tool_result","tool_use_id":"t1","content":"ok"}]}}"#,
        );
        assert_eq!(record.role(), &Role::ToolResult);
        assert_eq!(record.role().filter_name(), "tool");
        assert_eq!(record.first_tool_result_id(), Some("t1"));
    }

    #[test]
    fn plain_user_record() {
        let record = decode(r#"{"type":"user","message":{"content":"hello"}}"#);
        assert_eq!(record.role(), &Role::User);
        assert_eq!(record.first_tool_result_id(), None);
    }

    #[test]
    fn user_without_message_object_is_plain_user() {
        let record = decode(r#"{"type":"user","message":"oops"}"#);
        assert_eq!(record.role(), &Role::User);
        assert!(record.message().is_none());
        assert!(record.blocks().is_empty());
    }

    #[test]
    fn other_record_types_keep_literal_type() {
        let record = decode(r#"{"type":"summary","summary":"Session recap"}"#);
        assert_eq!(record.role(), &Role::Other("summary".to_string()));
        assert_eq!(record.role().filter_name(), "summary");

        let untyped = decode(r#"{"foo":1}"#);
        assert_eq!(untyped.role(), &Role::Other(String::new()));
    }

    #[test]
    fn accessors_read_top_level_fields() {
        let record = decode(
            r#"{"type":"assistant","timestamp":"2025-06-22T09:59:15.456Z","version":"1.0.30","message":{"model":"claude-sonnet-4","content":[]}}"#,
        );
        assert_eq!(record.timestamp(), Some("2025-06-22T09:59:15.456Z"));
        assert_eq!(record.version(), Some("1.0.30"));
        assert_eq!(record.model(), Some("claude-sonnet-4"));
        assert!(record.usage().is_none());
    }

    #[test]
    fn empty_version_is_treated_as_absent() {
        let record = decode(r#"{"type":"user","version":"","message":{"content":"x"}}"#);
        assert_eq!(record.version(), None);
    }

    #[test]
    fn tool_uses_lists_every_invocation() {
        let record = decode(
            r#"{"type":"assistant","message":{"content":[
                {"type":"text","text":"running"},
                {"type":"tool_use","id":"a","name":"Bash","input":{}},
                {"type":"tool_use","id":"b"}
            ]}}"#,
        );
        let uses: Vec<_> = record.tool_uses().collect();
        assert_eq!(uses, vec![(Some("a"), Some("Bash")), (Some("b"), None)]);
    }

    #[test]
    fn raw_preserves_unknown_fields() {
        let record = decode(r#"{"type":"user","cwd":"/tmp","nested":{"x":[1,2]},"message":{"content":"x"}}"#);
        assert_eq!(record.raw().get("cwd"), Some(&Value::String("/tmp".into())));
        assert!(record.raw().contains_key("nested"));
    }
}
