//! Permission request and result shapes, and target classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::types::RiskLevel;

/// Tool or action name fragments that mark the target as a shell command.
const SHELL_TOKENS: [&str; 6] = ["shell", "exec", "bash", "run", "command", "terminal"];

/// One tool action awaiting a permission decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRequest {
    /// Tool asking to act, e.g. `fs` or `shell`
    pub tool: String,
    /// Operation within the tool, e.g. `write` or `exec`
    pub action: String,
    /// The path or command the action applies to, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Free-form caller metadata, carried through to emitted events
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, Value>,
}

impl PermissionRequest {
    pub fn new(tool: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            action: action.into(),
            target: None,
            context: HashMap::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Stable key for the decision cache
    pub(crate) fn cache_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.tool,
            self.action,
            self.target.as_deref().unwrap_or("-")
        )
    }

    /// Decide which analyzer the target belongs to.
    ///
    /// Shell-flavored tools and actions always get command analysis, no
    /// matter how path-like their argument looks. Everything else goes by
    /// the shape of the target itself.
    pub(crate) fn target_kind(&self) -> TargetKind<'_> {
        let Some(target) = self.target.as_deref() else {
            return TargetKind::None;
        };
        let tool = self.tool.to_ascii_lowercase();
        let action = self.action.to_ascii_lowercase();
        if SHELL_TOKENS
            .iter()
            .any(|token| tool.contains(token) || action.contains(token))
        {
            return TargetKind::Command(target);
        }
        if looks_like_path(target) {
            TargetKind::Path(target)
        } else {
            TargetKind::Command(target)
        }
    }
}

/// Outcome of one permission check.
///
/// A denied result never asks for confirmation; confirmation is only ever a
/// condition on an allowed action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionResult {
    /// Whether the action may proceed
    pub allowed: bool,
    /// Whether the action needs operator confirmation before proceeding
    pub requires_confirmation: bool,
    /// Final risk attached to the action
    pub risk_level: RiskLevel,
    /// Name of the rule that matched, when one did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
    /// Human-readable explanation of the decision
    pub reason: String,
    /// Safer alternatives or remediation hints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    /// Non-blocking findings surfaced during analysis
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl PermissionResult {
    /// Allowed without conditions
    pub fn allow(risk_level: RiskLevel, reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            requires_confirmation: false,
            risk_level,
            matched_rule: None,
            reason: reason.into(),
            suggestions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Allowed once the operator confirms
    pub fn allow_with_confirmation(risk_level: RiskLevel, reason: impl Into<String>) -> Self {
        Self {
            requires_confirmation: true,
            ..Self::allow(risk_level, reason)
        }
    }

    /// Rejected outright; never requests confirmation
    pub fn deny(risk_level: RiskLevel, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            requires_confirmation: false,
            risk_level,
            matched_rule: None,
            reason: reason.into(),
            suggestions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.matched_rule = Some(rule.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// How the manager should treat a request's target.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TargetKind<'a> {
    Path(&'a str),
    Command(&'a str),
    None,
}

fn looks_like_path(target: &str) -> bool {
    if target.contains("://") {
        return false;
    }
    if target.starts_with('/')
        || target.starts_with("~/")
        || target.starts_with("./")
        || target.starts_with("../")
        || matches!(target, "~" | "." | "..")
    {
        return true;
    }
    (target.contains('/') || target.contains('\\')) && !target.chars().any(char::is_whitespace)
}
