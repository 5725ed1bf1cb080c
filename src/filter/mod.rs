//! Record filtering by role and tool name.
//!
//! Two mutually exclusive modes, selected by configuration:
//!
//! - **Tool mode** (any include or exclude pattern given): only records that
//!   carry tool traffic are considered, judged by tool name.
//! - **Role mode** (otherwise): records are judged by effective role.

pub mod glob;

use crate::correlation::ToolCorrelationTable;
use crate::model::{Record, Role};
use std::collections::BTreeSet;

pub use glob::{glob_match, matches_any};

// ===== FilterConfig =====

/// Process-wide filter settings, fixed before processing starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Allowed role names. Empty allows every role.
    pub roles: BTreeSet<String>,
    /// Tool name patterns to keep. Empty keeps every tool.
    pub tool_include: Vec<String>,
    /// Tool name patterns to drop. Checked before `tool_include`.
    pub tool_exclude: Vec<String>,
}

impl FilterConfig {
    /// Build a configuration from the comma-separated CLI lists.
    pub fn from_lists(roles: &str, tool_include: &str, tool_exclude: &str) -> Self {
        Self {
            roles: parse_list(roles).into_iter().collect(),
            tool_include: parse_list(tool_include),
            tool_exclude: parse_list(tool_exclude),
        }
    }

    /// True when tool-name filtering governs instead of role filtering.
    pub fn is_tool_mode(&self) -> bool {
        !self.tool_include.is_empty() || !self.tool_exclude.is_empty()
    }

    fn role_allowed(&self, role: &str) -> bool {
        self.roles.is_empty() || self.roles.contains(role)
    }
}

/// Split a comma-separated list, trimming items and dropping empty ones.
pub fn parse_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tool name predicate.
///
/// Exclusion wins; otherwise an empty include list accepts everything.
pub fn tool_passes<S: AsRef<str>>(name: &str, include: &[S], exclude: &[S]) -> bool {
    if matches_any(exclude, name) {
        return false;
    }
    include.is_empty() || matches_any(include, name)
}

// ===== FilterEngine =====

/// Decides per record whether it is shown.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    config: FilterConfig,
}

impl FilterEngine {
    /// Create an engine for the given configuration.
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Whether `record` passes the active filters.
    ///
    /// Tool names are resolved through `table`; a result whose invocation has
    /// not been observed is treated as an unknown tool.
    pub fn accepts(&self, record: &Record, table: &ToolCorrelationTable) -> bool {
        if self.config.is_tool_mode() {
            self.accepts_by_tool(record, table)
        } else {
            self.accepts_by_role(record, table)
        }
    }

    fn accepts_by_tool(&self, record: &Record, table: &ToolCorrelationTable) -> bool {
        match record.role() {
            Role::Assistant => {
                let mut uses = record.tool_uses().peekable();
                if uses.peek().is_none() {
                    return true;
                }
                uses.any(|(id, name)| self.tool_name_passes(invocation_name(table, id, name)))
            }
            Role::ToolResult => {
                let resolved = record
                    .first_tool_result_id()
                    .map(|id| table.lookup_name(id))
                    .unwrap_or_default();
                if resolved.is_empty() {
                    self.config.tool_include.is_empty()
                } else {
                    self.tool_name_passes(resolved)
                }
            }
            Role::User | Role::Other(_) => false,
        }
    }

    fn accepts_by_role(&self, record: &Record, table: &ToolCorrelationTable) -> bool {
        let role = record.role();
        if !self.config.role_allowed(role.filter_name()) {
            return false;
        }

        // Tool lists are empty in role mode, so every invocation passes here.
        if *role == Role::Assistant {
            return record
                .tool_uses()
                .all(|(id, name)| self.tool_name_passes(invocation_name(table, id, name)));
        }
        true
    }

    fn tool_name_passes(&self, name: &str) -> bool {
        tool_passes(name, &self.config.tool_include, &self.config.tool_exclude)
    }
}

/// Name of a `tool_use` block: the correlated name if known, else the block's own.
fn invocation_name<'a>(
    table: &'a ToolCorrelationTable,
    id: Option<&str>,
    name: Option<&'a str>,
) -> &'a str {
    id.map(|id| table.lookup_name(id))
        .filter(|resolved| !resolved.is_empty())
        .or(name)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASH_USE: &str = r#"{"type":"assistant","message":{"content":[{"type":"tool_use","id":"t1","name":"Bash","input":{"command":"ls"}}]}}"#;
    const EDIT_USE: &str = r#"{"type":"assistant","message":{"content":[{"type":"tool_use","id":"t2","name":"MultiEdit","input":{}}]}}"#;
    const BASH_RESULT: &str = r#"{"type":"user","message":{"content":[{"type":"tool_result","tool_use_id":"t1","content":"file.txt"}]}}"#;
    const ORPHAN_RESULT: &str = r#"{"type":"user","message":{"content":[{"type":"tool_result","tool_use_id":"zz","content":"?"}]}}"#;
    const ASSISTANT_TEXT: &str = r#"{"type":"assistant","message":{"content":[{"type":"text","text":"hi"}]}}"#;
    const USER_TEXT: &str = r#"{"type":"user","message":{"content":"hello"}}"#;
    const SUMMARY: &str = r#"{"type":"summary","summary":"recap"}"#;

    fn record(line: &str) -> Record {
        Record::decode(line.as_bytes()).expect("valid record")
    }

    fn engine(roles: &str, include: &str, exclude: &str) -> FilterEngine {
        FilterEngine::new(FilterConfig::from_lists(roles, include, exclude))
    }

    fn warm_table() -> ToolCorrelationTable {
        let mut table = ToolCorrelationTable::new();
        table.observe(&record(BASH_USE));
        table.observe(&record(EDIT_USE));
        table
    }

    #[test]
    fn parse_list_trims_and_drops_empties() {
        assert_eq!(parse_list(" Bash , ,Read,"), vec!["Bash", "Read"]);
        assert!(parse_list("").is_empty());
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn tool_passes_exclusion_wins() {
        assert!(tool_passes::<&str>("Bash", &[], &[]));
        assert!(tool_passes("Bash", &["Bash"], &[]));
        assert!(!tool_passes("Read", &["Bash"], &[]));
        assert!(!tool_passes("Bash", &["*"], &["Bash"]));
        assert!(tool_passes("Edit", &[], &["Bash"]));
        assert!(!tool_passes("MultiEdit", &[], &["*Edit"]));
    }

    #[test]
    fn empty_configuration_accepts_everything() {
        let engine = engine("", "", "");
        let table = warm_table();
        for line in [BASH_USE, BASH_RESULT, ORPHAN_RESULT, ASSISTANT_TEXT, USER_TEXT, SUMMARY] {
            assert!(engine.accepts(&record(line), &table), "rejected {line}");
        }
    }

    #[test]
    fn role_mode_treats_tool_results_as_tool_role() {
        let table = warm_table();
        let users = engine("user", "", "");
        assert!(users.accepts(&record(USER_TEXT), &table));
        assert!(!users.accepts(&record(BASH_RESULT), &table));

        let tools = engine("tool", "", "");
        assert!(tools.accepts(&record(BASH_RESULT), &table));
        assert!(!tools.accepts(&record(USER_TEXT), &table));
        assert!(!tools.accepts(&record(BASH_USE), &table));
    }

    #[test]
    fn role_mode_matches_other_types_literally() {
        let table = ToolCorrelationTable::new();
        assert!(engine("summary", "", "").accepts(&record(SUMMARY), &table));
        assert!(!engine("user,assistant", "", "").accepts(&record(SUMMARY), &table));
    }

    #[test]
    fn tool_mode_suppresses_plain_user_records_even_if_role_allowed() {
        let engine = engine("user", "Bash", "");
        let table = warm_table();
        assert!(!engine.accepts(&record(USER_TEXT), &table));
        assert!(!engine.accepts(&record(SUMMARY), &table));
    }

    #[test]
    fn tool_mode_passes_plain_assistant_text() {
        let engine = engine("", "Bash", "");
        assert!(engine.accepts(&record(ASSISTANT_TEXT), &warm_table()));
    }

    #[test]
    fn tool_mode_filters_invocations_and_results_by_name() {
        let engine = engine("", "Bash", "");
        let table = warm_table();
        assert!(engine.accepts(&record(BASH_USE), &table));
        assert!(engine.accepts(&record(BASH_RESULT), &table));
        assert!(!engine.accepts(&record(EDIT_USE), &table));
    }

    #[test]
    fn tool_mode_accepts_assistant_if_any_invocation_passes() {
        let mixed = record(
            r#"{"type":"assistant","message":{"content":[
                {"type":"tool_use","id":"a","name":"Read"},
                {"type":"tool_use","id":"b","name":"Bash"}
            ]}}"#,
        );
        let table = ToolCorrelationTable::new();
        assert!(engine("", "Bash", "").accepts(&mixed, &table));
        assert!(!engine("", "Grep", "").accepts(&mixed, &table));
    }

    #[test]
    fn unresolved_results_shown_only_without_allowlist() {
        let table = warm_table();
        assert!(!engine("", "Bash", "").accepts(&record(ORPHAN_RESULT), &table));
        assert!(engine("", "", "Bash").accepts(&record(ORPHAN_RESULT), &table));
    }

    #[test]
    fn exclude_only_mode_drops_matching_tools() {
        let engine = engine("", "", "*Edit");
        let table = warm_table();
        assert!(!engine.accepts(&record(EDIT_USE), &table));
        assert!(engine.accepts(&record(BASH_USE), &table));
        assert!(engine.accepts(&record(BASH_RESULT), &table));
    }

    #[test]
    fn wildcard_include_keeps_all_tool_traffic() {
        let engine = engine("", "*", "");
        let table = warm_table();
        assert!(engine.accepts(&record(BASH_USE), &table));
        assert!(engine.accepts(&record(BASH_RESULT), &table));
        assert!(!engine.accepts(&record(USER_TEXT), &table));
    }

    #[test]
    fn role_mode_rechecks_assistant_invocations_against_empty_lists() {
        let config = FilterConfig {
            roles: BTreeSet::from(["assistant".to_string()]),
            ..FilterConfig::default()
        };
        let engine = FilterEngine::new(config);
        assert!(!engine.config().is_tool_mode());
        assert!(engine.accepts(&record(BASH_USE), &warm_table()));
    }

    #[test]
    fn unresolved_invocation_falls_back_to_block_name() {
        let engine = engine("", "Bash", "");
        let table = ToolCorrelationTable::new();
        assert!(engine.accepts(&record(BASH_USE), &table));
        assert!(!engine.accepts(&record(BASH_RESULT), &table));
    }
}
