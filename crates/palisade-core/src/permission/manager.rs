//! The permission manager: rule resolution, target dispatch, decision
//! assembly, and event emission.

use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::command::CommandDangerAnalyzer;
use crate::config::PermissionConfig;
use crate::error::PalisadeResult;
use crate::path::{DirectoryPolicy, PathValidator, SharedDirectoryPolicy};
use crate::sensitive::SensitiveFileDetector;
use crate::types::{PermissionLevel, RiskLevel};

use super::events::{EventKind, EventStore, PermissionEvent, SharedEventHandler};
use super::request::PermissionRequest;
use super::{DecisionCache, PermissionResult, PermissionRule, RuleEngine, TargetKind};

/// What target analysis concluded, before rule policy is applied.
struct TargetAssessment {
    risk: RiskLevel,
    hard_reject: bool,
    reason: String,
    suggestions: Vec<String>,
    warnings: Vec<String>,
}

impl TargetAssessment {
    fn empty() -> Self {
        Self {
            risk: RiskLevel::Low,
            hard_reject: false,
            reason: "no target to inspect".to_string(),
            suggestions: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Central decision point for tool actions.
///
/// Checks are pure with respect to the request: the same request against the
/// same configuration and filesystem state yields the same decision. All
/// interior state (directory policy, cache, event log) is lock-guarded, so a
/// manager can be shared across threads behind an `Arc`.
pub struct PermissionManager {
    config: PermissionConfig,
    rules: RuleEngine,
    validator: PathValidator,
    analyzer: CommandDangerAnalyzer,
    detector: Arc<SensitiveFileDetector>,
    dirs: SharedDirectoryPolicy,
    cache: DecisionCache,
    events: EventStore,
    handler: Option<SharedEventHandler>,
}

impl PermissionManager {
    pub fn new(config: PermissionConfig) -> PalisadeResult<Self> {
        config.validate()?;
        let detector = Arc::new(SensitiveFileDetector::new(&config.sensitive_patterns)?);
        let dirs: SharedDirectoryPolicy = Arc::new(RwLock::new(DirectoryPolicy::new(
            config.allowed_dirs.clone(),
            config.blocked_dirs.clone(),
        )));
        let validator = PathValidator::with_parts(&config, Arc::clone(&detector), Arc::clone(&dirs));
        let analyzer = CommandDangerAnalyzer::new(&config)?;
        let rules = RuleEngine::new(&config.rules)?;
        let cache = DecisionCache::new(config.cache_ttl);
        let events = EventStore::new(config.max_events);
        Ok(Self {
            config,
            rules,
            validator,
            analyzer,
            detector,
            dirs,
            cache,
            events,
            handler: None,
        })
    }

    pub fn builder() -> PermissionManagerBuilder {
        PermissionManagerBuilder::new()
    }

    /// Decide whether one tool action may proceed.
    ///
    /// Pipeline: cache lookup, rule resolution, rule-level hard blocks,
    /// target analysis, decision assembly, event emission. Cached decisions
    /// are replayed verbatim and recorded as [`EventKind::Check`].
    pub fn check(&self, request: &PermissionRequest) -> PermissionResult {
        let key = request.cache_key();
        if let Some(cached) = self.cache.get(&key) {
            debug!(key, "permission decision served from cache");
            self.emit(EventKind::Check, request, &cached);
            return cached;
        }

        let result = self.decide(request);
        let kind = if !result.allowed {
            EventKind::Deny
        } else if result.requires_confirmation {
            EventKind::Confirm
        } else {
            EventKind::Grant
        };
        self.emit(kind, request, &result);
        self.cache.insert(key, result.clone());
        result
    }

    fn decide(&self, request: &PermissionRequest) -> PermissionResult {
        let resolved = self.rules.resolve(request);
        let (level, max_risk, force_confirmation, matched_rule, rule_reason) = match resolved {
            Some(compiled) => (
                compiled.rule.level,
                compiled.rule.max_risk_level,
                compiled.rule.require_confirmation,
                Some(compiled.rule.name()),
                compiled.rule.reason.clone(),
            ),
            // Unmatched requests fall back to the configured default level
            // with the standard risk ceiling.
            None => (
                self.config.default_level,
                RiskLevel::High,
                false,
                None,
                None,
            ),
        };

        // Rule-level hard blocks short-circuit before any analysis
        if let (Some(compiled), Some(target)) = (resolved, request.target.as_deref()) {
            if let Some(regex) = compiled.blocked_match(target) {
                warn!(tool = request.tool, target, "target hit a blocked pattern");
                let result = PermissionResult::deny(
                    RiskLevel::High,
                    format!(
                        "target matches blocked pattern '{}' of rule '{}'",
                        regex.as_str(),
                        compiled.rule.name()
                    ),
                );
                return attach_rule(result, matched_rule);
            }
        }

        let assessment = match panic::catch_unwind(AssertUnwindSafe(|| self.assess(request))) {
            Ok(assessment) => assessment,
            Err(_) => {
                error!(
                    tool = request.tool,
                    action = request.action,
                    "target analysis panicked"
                );
                let result =
                    PermissionResult::deny(RiskLevel::High, "internal error during target analysis");
                return attach_rule(result, matched_rule);
            }
        };

        let risk = assessment.risk;
        let strict = self.config.strict_mode;
        let denial_reason = if assessment.hard_reject {
            Some(assessment.reason.clone())
        } else if level == PermissionLevel::Deny {
            Some(rule_reason.unwrap_or_else(|| match &matched_rule {
                Some(name) => format!("denied by rule '{name}'"),
                None => "denied by default policy".to_string(),
            }))
        } else if risk > max_risk {
            Some(format!(
                "risk {risk} exceeds the permitted ceiling {max_risk}"
            ))
        } else if strict && risk >= RiskLevel::High {
            Some(format!("strict mode rejects {risk} risk actions"))
        } else {
            None
        };

        if let Some(reason) = denial_reason {
            let result = PermissionResult::deny(risk, reason)
                .with_suggestions(assessment.suggestions)
                .with_warnings(assessment.warnings);
            return attach_rule(result, matched_rule);
        }

        let requires_confirmation = force_confirmation
            || level == PermissionLevel::Ask
            || (!strict && risk.requires_confirmation());
        let result = if requires_confirmation {
            PermissionResult::allow_with_confirmation(risk, assessment.reason)
        } else {
            PermissionResult::allow(risk, assessment.reason)
        };
        attach_rule(
            result
                .with_suggestions(assessment.suggestions)
                .with_warnings(assessment.warnings),
            matched_rule,
        )
    }

    fn assess(&self, request: &PermissionRequest) -> TargetAssessment {
        match request.target_kind() {
            TargetKind::None => TargetAssessment::empty(),
            TargetKind::Path(path) => {
                let outcome = self.validator.validate(path);
                let mut suggestions = Vec::new();
                let mut warnings = Vec::new();
                for warning in &outcome.warnings {
                    if let Some(suggestion) = &warning.suggestion {
                        suggestions.push(suggestion.clone());
                    }
                    warnings.push(warning.message.clone());
                }
                TargetAssessment {
                    risk: outcome.risk,
                    hard_reject: !outcome.valid,
                    reason: outcome.reason,
                    suggestions,
                    warnings,
                }
            }
            TargetKind::Command(command) => {
                let outcome = self.analyzer.analyze(command);
                TargetAssessment {
                    risk: outcome.risk_level,
                    hard_reject: !outcome.allowed,
                    reason: outcome.reason,
                    suggestions: outcome.safer_alternatives,
                    warnings: Vec::new(),
                }
            }
        }
    }

    fn emit(&self, kind: EventKind, request: &PermissionRequest, result: &PermissionResult) {
        let event = PermissionEvent::new(kind, request.clone(), result.clone());
        self.events.record(event.clone());
        if let Some(handler) = &self.handler {
            // A misbehaving observer must never change a decision
            if panic::catch_unwind(AssertUnwindSafe(|| handler.on_event(&event))).is_err() {
                warn!(kind = %event.kind, "event handler panicked");
            }
        }
    }

    /// Add a directory to the allow list and drop stale cached decisions
    pub fn add_allowed_dir(&self, dir: impl AsRef<Path>) {
        self.dirs.write().add_allowed(dir);
        self.cache.clear();
    }

    /// Add a directory to the block list and drop stale cached decisions
    pub fn add_blocked_dir(&self, dir: impl AsRef<Path>) {
        self.dirs.write().add_blocked(dir);
        self.cache.clear();
    }

    pub fn remove_allowed_dir(&self, dir: impl AsRef<Path>) -> bool {
        let removed = self.dirs.write().remove_allowed(dir);
        if removed {
            self.cache.clear();
        }
        removed
    }

    pub fn remove_blocked_dir(&self, dir: impl AsRef<Path>) -> bool {
        let removed = self.dirs.write().remove_blocked(dir);
        if removed {
            self.cache.clear();
        }
        removed
    }

    pub fn config(&self) -> &PermissionConfig {
        &self.config
    }

    pub fn validator(&self) -> &PathValidator {
        &self.validator
    }

    pub fn analyzer(&self) -> &CommandDangerAnalyzer {
        &self.analyzer
    }

    pub fn detector(&self) -> &SensitiveFileDetector {
        &self.detector
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    /// Snapshot of the current directory policy
    pub fn directories(&self) -> DirectoryPolicy {
        self.dirs.read().clone()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Fluent construction for [`PermissionManager`].
pub struct PermissionManagerBuilder {
    config: PermissionConfig,
    handler: Option<SharedEventHandler>,
}

impl Default for PermissionManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionManagerBuilder {
    pub fn new() -> Self {
        Self {
            config: PermissionConfig::default(),
            handler: None,
        }
    }

    /// Start from a complete configuration instead of the default
    pub fn config(mut self, config: PermissionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn default_level(mut self, level: PermissionLevel) -> Self {
        self.config.default_level = level;
        self
    }

    pub fn rule(mut self, rule: PermissionRule) -> Self {
        self.config.rules.push(rule);
        self
    }

    pub fn allowed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.allowed_dirs.push(dir.into());
        self
    }

    pub fn blocked_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.blocked_dirs.push(dir.into());
        self
    }

    pub fn sensitive_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.sensitive_patterns.push(pattern.into());
        self
    }

    pub fn dangerous_command(mut self, pattern: impl Into<String>) -> Self {
        self.config.dangerous_commands.push(pattern.into());
        self
    }

    pub fn allow_symlinks(mut self, allow: bool) -> Self {
        self.config.allow_symlinks = allow;
        self
    }

    pub fn max_path_depth(mut self, depth: usize) -> Self {
        self.config.max_path_depth = depth;
        self
    }

    pub fn strict_mode(mut self, strict: bool) -> Self {
        self.config.strict_mode = strict;
        self
    }

    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = dir.into();
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl = ttl;
        self
    }

    pub fn max_events(mut self, max: usize) -> Self {
        self.config.max_events = max;
        self
    }

    pub fn handler(mut self, handler: SharedEventHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn build(self) -> PalisadeResult<PermissionManager> {
        let mut manager = PermissionManager::new(self.config)?;
        manager.handler = self.handler;
        Ok(manager)
    }
}

fn attach_rule(result: PermissionResult, rule: Option<String>) -> PermissionResult {
    match rule {
        Some(name) => result.with_rule(name),
        None => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "/home/user/project";

    fn manager() -> PermissionManagerBuilder {
        PermissionManager::builder().base_dir(BASE)
    }

    fn fs_request(target: &str) -> PermissionRequest {
        PermissionRequest::new("fs", "write").with_target(target)
    }

    fn shell_request(command: &str) -> PermissionRequest {
        PermissionRequest::new("shell", "exec").with_target(command)
    }

    #[test]
    fn test_allow_rule_grants_low_risk_path() {
        let manager = manager()
            .rule(PermissionRule::new("fs", PermissionLevel::Allow))
            .build()
            .unwrap();
        let result = manager.check(&fs_request("src/main.rs"));
        assert!(result.allowed);
        assert!(!result.requires_confirmation);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.matched_rule.as_deref(), Some("fs"));
    }

    #[test]
    fn test_deny_rule_rejects_without_confirmation() {
        let manager = manager()
            .rule(
                PermissionRule::new("fs", PermissionLevel::Deny)
                    .with_reason("filesystem writes are off"),
            )
            .build()
            .unwrap();
        let result = manager.check(&fs_request("src/main.rs"));
        assert!(!result.allowed);
        assert!(!result.requires_confirmation);
        assert_eq!(result.reason, "filesystem writes are off");
    }

    #[test]
    fn test_unmatched_request_uses_default_level() {
        let manager = manager()
            .default_level(PermissionLevel::Ask)
            .build()
            .unwrap();
        let result = manager.check(&fs_request("src/main.rs"));
        assert!(result.allowed);
        assert!(result.requires_confirmation);
        assert!(result.matched_rule.is_none());
    }

    #[test]
    fn test_traversal_target_is_denied_critical() {
        let manager = manager()
            .default_level(PermissionLevel::Allow)
            .build()
            .unwrap();
        let result = manager.check(&fs_request("../../../etc/passwd"));
        assert!(!result.allowed);
        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert!(result.reason.contains("traversal"));
    }

    #[test]
    fn test_shell_rm_rf_root_is_denied_with_alternatives() {
        let manager = manager()
            .default_level(PermissionLevel::Allow)
            .build()
            .unwrap();
        let result = manager.check(&shell_request("rm -rf /"));
        assert!(!result.allowed);
        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert!(result.reason.contains("file_destruction"));
        assert!(result.suggestions.iter().any(|s| s.contains("trash")));
    }

    #[test]
    fn test_high_risk_command_confirms_outside_strict_mode() {
        let manager = manager()
            .default_level(PermissionLevel::Allow)
            .build()
            .unwrap();
        let result = manager.check(&shell_request("sudo systemctl restart nginx"));
        assert!(result.allowed);
        assert!(result.requires_confirmation);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_strict_mode_denies_high_risk() {
        let manager = manager()
            .default_level(PermissionLevel::Allow)
            .strict_mode(true)
            .build()
            .unwrap();
        // command route: the analyzer itself rejects high severity under strict
        let command = manager.check(&shell_request("sudo systemctl restart nginx"));
        assert!(!command.allowed);
        assert_eq!(command.risk_level, RiskLevel::High);

        // path route: sensitivity raises the risk and strict mode turns the
        // otherwise-valid path into a denial
        let path = manager.check(&fs_request("/home/user/project/.env"));
        assert!(!path.allowed);
        assert_eq!(path.risk_level, RiskLevel::High);
        assert!(path.reason.contains("strict mode"));
    }

    #[test]
    fn test_rule_risk_ceiling_denies_above_it() {
        let manager = manager()
            .rule(
                PermissionRule::new("fs", PermissionLevel::Allow)
                    .with_max_risk(RiskLevel::Medium),
            )
            .build()
            .unwrap();
        // .env classifies high, above the medium ceiling
        let result = manager.check(&fs_request("/home/user/project/.env"));
        assert!(!result.allowed);
        assert!(result.reason.contains("exceeds"));
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_rule_blocked_patterns_hard_deny() {
        let manager = manager()
            .rule(
                PermissionRule::new("fs", PermissionLevel::Allow)
                    .with_blocked_patterns(vec![r"\.lock$".to_string()]),
            )
            .build()
            .unwrap();
        let result = manager.check(&fs_request("/home/user/project/Cargo.lock"));
        assert!(!result.allowed);
        assert!(result.reason.contains("blocked pattern"));
    }

    #[test]
    fn test_rule_confirmation_flag_forces_confirmation() {
        let manager = manager()
            .rule(PermissionRule::new("fs", PermissionLevel::Allow).with_confirmation())
            .build()
            .unwrap();
        let result = manager.check(&fs_request("src/main.rs"));
        assert!(result.allowed);
        assert!(result.requires_confirmation);
    }

    #[test]
    fn test_request_without_target_decides_on_rule_alone() {
        let manager = manager()
            .rule(PermissionRule::new("env", PermissionLevel::Allow))
            .build()
            .unwrap();
        let result = manager.check(&PermissionRequest::new("env", "list"));
        assert!(result.allowed);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_invalid_configuration_fails_construction() {
        let result = manager().max_path_depth(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_collects_rules_and_dirs() {
        let manager = manager()
            .rule(PermissionRule::new("fs", PermissionLevel::Allow))
            .rule(PermissionRule::new("shell", PermissionLevel::Ask))
            .allowed_dir("/home/user/project")
            .build()
            .unwrap();
        assert_eq!(manager.rule_count(), 2);
        assert!(manager
            .directories()
            .allowed
            .contains(&PathBuf::from("/home/user/project")));
    }
}
