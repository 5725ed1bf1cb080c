//! Tool invocation correlation.
//!
//! Tool results only carry the id of the `tool_use` block they answer. The
//! [`ToolCorrelationTable`] remembers each invocation's name and input so that
//! later results can be filtered and rendered by tool.

use crate::model::{ContentBlock, JsonObject, Record, Role};
use std::collections::HashMap;

/// Mapping from tool invocation id to name and input.
///
/// First registration wins: an id that appears again keeps its original name
/// and input, so re-observing a record is a no-op.
#[derive(Debug, Default, Clone)]
pub struct ToolCorrelationTable {
    names: HashMap<String, String>,
    inputs: HashMap<String, JsonObject>,
}

impl ToolCorrelationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every `tool_use` block of an assistant record.
    ///
    /// Other roles are ignored. A block is registered only when it has both an
    /// id and a name; its input is stored only when it is a JSON object.
    pub fn observe(&mut self, record: &Record) {
        if *record.role() != Role::Assistant {
            return;
        }

        for block in record.blocks() {
            let ContentBlock::ToolUse {
                id: Some(id),
                name: Some(name),
                input,
            } = block
            else {
                continue;
            };

            self.names
                .entry(id.clone())
                .or_insert_with(|| name.clone());
            if let Some(input) = input {
                self.inputs
                    .entry(id.clone())
                    .or_insert_with(|| input.clone());
            }
        }
    }

    /// Tool name registered for `id`, or `""` if unknown.
    pub fn lookup_name(&self, id: &str) -> &str {
        self.names.get(id).map(String::as_str).unwrap_or_default()
    }

    /// Tool input registered for `id`.
    pub fn lookup_input(&self, id: &str) -> Option<&JsonObject> {
        self.inputs.get(id)
    }

    /// Number of registered invocations.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
