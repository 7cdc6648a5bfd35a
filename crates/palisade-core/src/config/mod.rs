//! Engine configuration handed in whole at construction time.

mod defaults;

pub use defaults::{default_blocked_dirs, minimal_blocked_dirs};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PalisadeError, PalisadeResult};
use crate::permission::PermissionRule;
use crate::types::PermissionLevel;
use defaults::{default_base_dir, default_cache_ttl, default_max_events, default_max_path_depth};

/// Process-wide permission policy
///
/// Immutable for the lifetime of a decision session; the only sanctioned
/// mutations are the manager's add/remove directory calls and cache
/// maintenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// Level applied when no rule matches a request
    #[serde(default)]
    pub default_level: PermissionLevel,

    /// Ordered rules; the first structural match wins
    #[serde(default)]
    pub rules: Vec<PermissionRule>,

    /// Absolute directory prefixes access is restricted to (empty = allow
    /// unless blocked)
    #[serde(default)]
    pub allowed_dirs: Vec<PathBuf>,

    /// Absolute directory prefixes that always reject
    #[serde(default = "default_blocked_dirs")]
    pub blocked_dirs: Vec<PathBuf>,

    /// Extra sensitive-file regexes, appended after the built-in table
    #[serde(default)]
    pub sensitive_patterns: Vec<String>,

    /// Extra dangerous-command regexes, appended after the built-in tables
    #[serde(default)]
    pub dangerous_commands: Vec<String>,

    /// Skip the symlink-escape walk entirely
    #[serde(default)]
    pub allow_symlinks: bool,

    /// Maximum number of non-empty path segments
    #[serde(default = "default_max_path_depth")]
    pub max_path_depth: usize,

    /// Deny on elevated risk instead of asking for confirmation
    #[serde(default)]
    pub strict_mode: bool,

    /// Base directory for resolving relative request paths
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Decision cache lifetime; zero disables caching
    #[serde(with = "humantime_serde", default = "default_cache_ttl")]
    pub cache_ttl: Duration,

    /// Maximum audit events retained before oldest-first eviction
    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            default_level: PermissionLevel::Ask,
            rules: vec![],
            allowed_dirs: vec![],
            blocked_dirs: default_blocked_dirs(),
            sensitive_patterns: vec![],
            dangerous_commands: vec![],
            allow_symlinks: false,
            max_path_depth: default_max_path_depth(),
            strict_mode: false,
            base_dir: default_base_dir(),
            cache_ttl: default_cache_ttl(),
            max_events: default_max_events(),
        }
    }
}

impl PermissionConfig {
    /// Permissive policy: wide access, symlinks allowed, minimal block list
    pub fn permissive() -> Self {
        Self {
            default_level: PermissionLevel::Allow,
            blocked_dirs: minimal_blocked_dirs(),
            allow_symlinks: true,
            max_path_depth: 64,
            ..Self::default()
        }
    }

    /// Strict policy confined to a single working directory
    ///
    /// Every decision is re-evaluated (no caching) and elevated risk denies
    /// instead of asking.
    pub fn strict(base_dir: PathBuf) -> Self {
        Self {
            default_level: PermissionLevel::Ask,
            allowed_dirs: vec![base_dir.clone()],
            strict_mode: true,
            base_dir,
            cache_ttl: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Check structural soundness before the engine compiles patterns
    pub fn validate(&self) -> PalisadeResult<()> {
        if self.max_path_depth == 0 {
            return Err(PalisadeError::Config(
                "max_path_depth must be at least 1".to_string(),
            ));
        }
        if !self.base_dir.is_absolute() {
            return Err(PalisadeError::Config(format!(
                "base_dir must be absolute, got '{}'",
                self.base_dir.display()
            )));
        }
        for dir in self.allowed_dirs.iter().chain(self.blocked_dirs.iter()) {
            if !dir.is_absolute() {
                return Err(PalisadeError::Config(format!(
                    "directory prefixes must be absolute, got '{}'",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
