use crate::config::ApprovalConfig;

use super::interface::ToolDefinition;

/// Decides which tool calls need a yes/no from the operator before running.
#[derive(Debug, Clone, Default)]
pub struct ApprovalPolicy {
    tools: Vec<String>,
    verbs: Vec<String>,
    exempt: Vec<String>,
}

impl ApprovalPolicy {
    pub fn new(config: &ApprovalConfig) -> Self {
        Self {
            tools: config.tools.clone(),
            verbs: config.verbs.clone(),
            exempt: config.exempt.clone(),
        }
    }

    /// A policy that never asks.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn requires_approval(&self, tool: &ToolDefinition) -> bool {
        let function_name = tool.function_name();
        let matches = |names: &[String]| {
            names.iter().any(|name| {
                name.eq_ignore_ascii_case(&function_name)
                    || name.eq_ignore_ascii_case(&tool.qualified_name)
            })
        };
        if matches(&self.exempt) {
            return false;
        }
        if matches(&self.tools) {
            return true;
        }
        let action = tool.name.to_ascii_lowercase();
        self.verbs
            .iter()
            .any(|verb| action.starts_with(&verb.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(qualified: &str) -> ToolDefinition {
        let name = qualified.split('.').next_back().unwrap_or(qualified);
        serde_json::from_value(json!({"name": name, "qualified_name": qualified}))
            .expect("tool parses")
    }

    fn policy(tools: &[&str], verbs: &[&str], exempt: &[&str]) -> ApprovalPolicy {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        ApprovalPolicy::new(&ApprovalConfig {
            tools: owned(tools),
            verbs: owned(verbs),
            exempt: owned(exempt),
        })
    }

    #[test]
    fn verbs_match_the_action_name() {
        let policy = policy(&[], &["Archive", "Update"], &[]);
        assert!(policy.requires_approval(&tool("Linear.ArchiveIssue")));
        assert!(policy.requires_approval(&tool("Linear.UpdateProject")));
        assert!(!policy.requires_approval(&tool("Linear.GetIssue")));
    }

    #[test]
    fn explicit_tools_and_exemptions_win() {
        let policy = policy(&["Linear_AddComment"], &["Archive"], &["Linear.ArchiveCycle"]);
        assert!(policy.requires_approval(&tool("Linear.AddComment")));
        assert!(!policy.requires_approval(&tool("Linear.ArchiveCycle")));
        assert!(policy.requires_approval(&tool("Linear.ArchiveIssue")));
    }

    #[test]
    fn verbs_ignore_case_like_tool_names() {
        let policy = policy(&["linear_addcomment"], &["archive"], &["LINEAR.ARCHIVECYCLE"]);
        assert!(policy.requires_approval(&tool("Linear.ArchiveIssue")));
        assert!(policy.requires_approval(&tool("Linear.AddComment")));
        assert!(!policy.requires_approval(&tool("Linear.ArchiveCycle")));
        assert!(!policy.requires_approval(&tool("Linear.GetIssue")));
    }

    #[test]
    fn empty_policy_never_asks() {
        assert!(!ApprovalPolicy::none().requires_approval(&tool("Linear.ArchiveIssue")));
    }
}
