//! Per-tool permission rules and the first-match resolution engine.

use glob::Pattern;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PalisadeError, PalisadeResult};
use crate::types::{PermissionLevel, RiskLevel};

use super::request::PermissionRequest;

fn default_max_risk() -> RiskLevel {
    RiskLevel::High
}

fn default_enabled() -> bool {
    true
}

/// A declarative permission rule.
///
/// Rules are evaluated in declaration order and the first match wins. A rule
/// matches when its tool name equals the request's tool (or is `*`) and its
/// glob pattern, when present, matches the request target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRule {
    /// Tool the rule applies to, `*` for any
    pub tool: String,
    /// Glob over the request target; absent means "any target, or none"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Decision level applied when the rule matches
    #[serde(default)]
    pub level: PermissionLevel,
    /// Highest analyzed risk the rule still allows through
    #[serde(default = "default_max_risk")]
    pub max_risk_level: RiskLevel,
    /// Regexes that hard-deny a matching target outright
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_patterns: Vec<String>,
    /// Force a confirmation even for low-risk targets
    #[serde(default)]
    pub require_confirmation: bool,
    /// Operator-facing note carried into denials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Disabled rules are skipped during resolution
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl PermissionRule {
    pub fn new(tool: impl Into<String>, level: PermissionLevel) -> Self {
        Self {
            tool: tool.into(),
            pattern: None,
            level,
            max_risk_level: default_max_risk(),
            blocked_patterns: Vec::new(),
            require_confirmation: false,
            reason: None,
            enabled: true,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_max_risk(mut self, level: RiskLevel) -> Self {
        self.max_risk_level = level;
        self
    }

    pub fn with_blocked_patterns(mut self, patterns: Vec<String>) -> Self {
        self.blocked_patterns = patterns;
        self
    }

    pub fn with_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Identifier used in results and events
    pub fn name(&self) -> String {
        match &self.pattern {
            Some(pattern) => format!("{}:{}", self.tool, pattern),
            None => self.tool.clone(),
        }
    }
}

impl std::fmt::Display for PermissionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.name(), self.level)?;
        if !self.enabled {
            write!(f, " (disabled)")?;
        }
        Ok(())
    }
}

/// A rule with its patterns compiled once at engine construction.
pub(crate) struct CompiledRule {
    pub rule: PermissionRule,
    pattern: Option<Pattern>,
    blocked: Vec<Regex>,
}

impl CompiledRule {
    fn compile(rule: PermissionRule) -> PalisadeResult<Self> {
        let pattern = match &rule.pattern {
            Some(source) => {
                let compiled = Pattern::new(source).map_err(|err| PalisadeError::InvalidRule {
                    tool: rule.tool.clone(),
                    message: format!("glob '{source}' failed to compile: {err}"),
                })?;
                Some(compiled)
            }
            None => None,
        };
        let mut blocked = Vec::with_capacity(rule.blocked_patterns.len());
        for source in &rule.blocked_patterns {
            let regex = RegexBuilder::new(source)
                .case_insensitive(true)
                .build()
                .map_err(|err| PalisadeError::invalid_pattern(source, &err))?;
            blocked.push(regex);
        }
        Ok(Self {
            rule,
            pattern,
            blocked,
        })
    }

    fn matches(&self, request: &PermissionRequest) -> bool {
        if !self.rule.enabled {
            return false;
        }
        if self.rule.tool != "*" && !self.rule.tool.eq_ignore_ascii_case(&request.tool) {
            return false;
        }
        match (&self.pattern, request.target.as_deref()) {
            (Some(pattern), Some(target)) => pattern.matches(target),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    /// First blocked regex matching `target`, if any
    pub fn blocked_match(&self, target: &str) -> Option<&Regex> {
        self.blocked.iter().find(|regex| regex.is_match(target))
    }
}

/// Ordered rule set with first-match resolution.
pub(crate) struct RuleEngine {
    rules: Vec<CompiledRule>,
}

impl RuleEngine {
    pub fn new(rules: &[PermissionRule]) -> PalisadeResult<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            compiled.push(CompiledRule::compile(rule.clone())?);
        }
        Ok(Self { rules: compiled })
    }

    /// First enabled rule matching the request, in declaration order
    pub fn resolve(&self, request: &PermissionRequest) -> Option<&CompiledRule> {
        let hit = self.rules.iter().find(|rule| rule.matches(request));
        if let Some(compiled) = hit {
            debug!(
                tool = request.tool,
                rule = %compiled.rule.name(),
                "permission rule matched"
            );
        }
        hit
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}
