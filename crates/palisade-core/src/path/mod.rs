//! Path validation pipeline.
//!
//! Seven ordered stages, first failure short-circuits:
//! normalize, raw traversal detection, depth, blocked directories, allowed
//! directories, symlink escapes, sensitivity classification. Encoding-based
//! traversal is evaluated on the raw input before any filesystem-aware
//! check can be reached.

mod normalize;
mod symlink;
mod traversal;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::PermissionConfig;
use crate::error::PalisadeResult;
use crate::sensitive::{SensitiveFileDetector, SensitiveFileResult};
use crate::types::RiskLevel;
use symlink::SymlinkOutcome;

/// Which pipeline stage produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStage {
    Normalize,
    Traversal,
    Depth,
    BlockedDir,
    AllowedDir,
    Symlink,
    Sensitivity,
}

impl CheckStage {
    /// Snake_case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStage::Normalize => "normalize",
            CheckStage::Traversal => "traversal",
            CheckStage::Depth => "depth",
            CheckStage::BlockedDir => "blocked_dir",
            CheckStage::AllowedDir => "allowed_dir",
            CheckStage::Symlink => "symlink",
            CheckStage::Sensitivity => "sensitivity",
        }
    }
}

/// Severity of a non-blocking finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Info,
    Warning,
    Critical,
}

/// A non-blocking finding attached to a validation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// What was noticed
    pub message: String,
    /// How seriously to take it
    pub severity: WarningSeverity,
    /// Optional remediation hint
    pub suggestion: Option<String>,
}

impl ValidationWarning {
    /// Informational finding
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: WarningSeverity::Info,
            suggestion: None,
        }
    }

    /// Concerning finding
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: WarningSeverity::Warning,
            suggestion: None,
        }
    }

    /// Serious finding that still did not block on its own
    pub fn critical(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: WarningSeverity::Critical,
            suggestion: None,
        }
    }

    /// Attach a remediation hint
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Dynamic allow/block directory sets
///
/// Block always wins over allow; an empty allow list means "allow unless
/// blocked." Membership is component-boundary prefix containment, so
/// `/foo` contains `/foo/bar` but not `/foobar`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryPolicy {
    pub allowed: Vec<PathBuf>,
    pub blocked: Vec<PathBuf>,
}

impl DirectoryPolicy {
    pub fn new(allowed: Vec<PathBuf>, blocked: Vec<PathBuf>) -> Self {
        Self { allowed, blocked }
    }

    /// The blocked directory containing `path`, if any
    pub fn blocking_dir(&self, path: &Path) -> Option<&PathBuf> {
        self.blocked.iter().find(|dir| path.starts_with(dir))
    }

    /// Whether `path` falls inside a blocked directory
    pub fn is_blocked(&self, path: &Path) -> bool {
        self.blocking_dir(path).is_some()
    }

    /// Whether the allow list admits `path`
    pub fn allows(&self, path: &Path) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|dir| path.starts_with(dir))
    }

    /// Add a directory to the allow list, lexically collapsed
    pub fn add_allowed(&mut self, dir: impl AsRef<Path>) {
        let dir = normalize::collapse(dir.as_ref());
        if !self.allowed.contains(&dir) {
            self.allowed.push(dir);
        }
    }

    /// Add a directory to the block list, lexically collapsed
    pub fn add_blocked(&mut self, dir: impl AsRef<Path>) {
        let dir = normalize::collapse(dir.as_ref());
        if !self.blocked.contains(&dir) {
            self.blocked.push(dir);
        }
    }

    /// Remove a directory from the allow list, reporting whether it was there
    pub fn remove_allowed(&mut self, dir: impl AsRef<Path>) -> bool {
        let dir = normalize::collapse(dir.as_ref());
        let before = self.allowed.len();
        self.allowed.retain(|d| d != &dir);
        self.allowed.len() != before
    }

    /// Remove a directory from the block list, reporting whether it was there
    pub fn remove_blocked(&mut self, dir: impl AsRef<Path>) -> bool {
        let dir = normalize::collapse(dir.as_ref());
        let before = self.blocked.len();
        self.blocked.retain(|d| d != &dir);
        self.blocked.len() != before
    }
}

/// Shared handle to the directory policy
pub type SharedDirectoryPolicy = Arc<RwLock<DirectoryPolicy>>;

/// Outcome of validating one path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathValidationResult {
    /// Whether the path passed every stage
    pub valid: bool,
    /// Risk attached to the outcome (maximum of all findings)
    pub risk: RiskLevel,
    /// Stage-specific explanation, present on success too
    pub reason: String,
    /// Lexically normalized absolute path (best effort on rejection)
    pub normalized: PathBuf,
    /// Stage that produced the verdict
    pub stage: CheckStage,
    /// Whether a blocked directory caused the rejection
    pub is_blocked: bool,
    /// Sensitivity classification, populated on success
    pub sensitive: Option<SensitiveFileResult>,
    /// Non-blocking findings accumulated along the way
    pub warnings: Vec<ValidationWarning>,
}

impl PathValidationResult {
    /// A stage rejected the path
    pub fn rejected(
        stage: CheckStage,
        risk: RiskLevel,
        reason: impl Into<String>,
        normalized: PathBuf,
    ) -> Self {
        Self {
            valid: false,
            risk,
            reason: reason.into(),
            normalized,
            stage,
            is_blocked: false,
            sensitive: None,
            warnings: Vec::new(),
        }
    }

    /// Every stage passed
    pub fn accepted(risk: RiskLevel, reason: impl Into<String>, normalized: PathBuf) -> Self {
        Self {
            valid: true,
            risk,
            reason: reason.into(),
            normalized,
            stage: CheckStage::Sensitivity,
            is_blocked: false,
            sensitive: None,
            warnings: Vec::new(),
        }
    }
}

/// Validates attacker-controlled paths against the configured policy
pub struct PathValidator {
    base_dir: PathBuf,
    max_depth: usize,
    allow_symlinks: bool,
    dirs: SharedDirectoryPolicy,
    detector: Arc<SensitiveFileDetector>,
}

impl PathValidator {
    /// Build a standalone validator from a configuration
    pub fn new(config: &PermissionConfig) -> PalisadeResult<Self> {
        config.validate()?;
        let detector = Arc::new(SensitiveFileDetector::new(&config.sensitive_patterns)?);
        let dirs = Arc::new(RwLock::new(DirectoryPolicy::new(
            config.allowed_dirs.clone(),
            config.blocked_dirs.clone(),
        )));
        Ok(Self::with_parts(config, detector, dirs))
    }

    /// Build a validator over shared parts (manager wiring)
    pub(crate) fn with_parts(
        config: &PermissionConfig,
        detector: Arc<SensitiveFileDetector>,
        dirs: SharedDirectoryPolicy,
    ) -> Self {
        Self {
            base_dir: normalize::collapse(&config.base_dir),
            max_depth: config.max_path_depth,
            allow_symlinks: config.allow_symlinks,
            dirs,
            detector,
        }
    }

    /// Snapshot of the current directory policy
    pub fn directories(&self) -> DirectoryPolicy {
        self.dirs.read().clone()
    }

    /// Run the full validation pipeline on one raw input
    pub fn validate(&self, raw: &str) -> PathValidationResult {
        // Stage 1: pure lexical normalization
        let normalized = match normalize::normalize(raw, &self.base_dir) {
            Ok(path) => path,
            Err(err) => {
                warn!(path = raw, error = %err, "path normalization failed");
                return PathValidationResult::rejected(
                    CheckStage::Normalize,
                    RiskLevel::High,
                    format!("normalization failed: {err}"),
                    PathBuf::from(raw),
                );
            }
        };

        // Stage 2: traversal intent on the raw input
        if let Some(reason) = traversal::detect_traversal(raw) {
            warn!(path = raw, "traversal attempt rejected");
            return PathValidationResult::rejected(
                CheckStage::Traversal,
                RiskLevel::Critical,
                reason,
                normalized,
            );
        }
        // Relative inputs must stay inside the base directory once resolved
        if !Path::new(raw).is_absolute() && !normalized.starts_with(&self.base_dir) {
            warn!(path = raw, base = %self.base_dir.display(), "relative path escapes base");
            return PathValidationResult::rejected(
                CheckStage::Traversal,
                RiskLevel::Critical,
                format!(
                    "relative path resolves outside the base directory '{}'",
                    self.base_dir.display()
                ),
                normalized,
            );
        }

        // Stage 3: depth limit
        let depth = normalize::depth(&normalized);
        if depth > self.max_depth {
            return PathValidationResult::rejected(
                CheckStage::Depth,
                RiskLevel::Medium,
                format!("path depth {depth} exceeds the maximum of {}", self.max_depth),
                normalized,
            );
        }

        // Stages 4 and 5: directory policy, on an owned snapshot
        let policy = self.dirs.read().clone();
        if let Some(dir) = policy.blocking_dir(&normalized) {
            warn!(path = %normalized.display(), blocked_dir = %dir.display(), "blocked directory hit");
            let mut result = PathValidationResult::rejected(
                CheckStage::BlockedDir,
                RiskLevel::High,
                format!("path is inside blocked directory '{}'", dir.display()),
                normalized,
            );
            result.is_blocked = true;
            return result;
        }
        if !policy.allows(&normalized) {
            return PathValidationResult::rejected(
                CheckStage::AllowedDir,
                RiskLevel::Medium,
                "path is outside all allowed directories".to_string(),
                normalized,
            );
        }

        // Stage 6: symlink escapes
        let mut warnings = Vec::new();
        if !self.allow_symlinks {
            match symlink::walk_symlinks(&normalized, &policy) {
                SymlinkOutcome::Clean => {}
                SymlinkOutcome::Incomplete => {
                    warnings.push(ValidationWarning::info(
                        "path component does not exist yet; symlink verification incomplete",
                    ));
                }
                SymlinkOutcome::Escape {
                    link,
                    target,
                    into_blocked,
                } => {
                    let destination = if into_blocked {
                        "a blocked directory"
                    } else {
                        "outside the allowed directories"
                    };
                    warn!(
                        link = %link.display(),
                        target = %target.display(),
                        "symlink escape rejected"
                    );
                    return PathValidationResult::rejected(
                        CheckStage::Symlink,
                        RiskLevel::Critical,
                        format!(
                            "symlink '{}' resolves to '{}', {destination}",
                            link.display(),
                            target.display()
                        ),
                        normalized,
                    );
                }
            }
        }

        // Stage 7: sensitivity classification on the normalized form
        let sensitive = self.detector.classify(&normalized.to_string_lossy());
        let (risk, reason) = if sensitive.is_sensitive {
            let kind = sensitive
                .sensitive_type
                .map(|k| k.as_str())
                .unwrap_or("unknown");
            (
                sensitive.risk_level(),
                format!(
                    "path validated; classified as {kind} ({:.2} confidence)",
                    sensitive.confidence
                ),
            )
        } else {
            (RiskLevel::Low, "path validated; no sensitive classification".to_string())
        };

        debug!(path = %normalized.display(), risk = %risk, "path validated");
        let mut result = PathValidationResult::accepted(risk, reason, normalized);
        result.sensitive = Some(sensitive);
        result.warnings = warnings;
        result
    }
}
