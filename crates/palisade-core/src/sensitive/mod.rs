//! Sensitive-file classification.
//!
//! Matches a path against an ordered table of typed patterns (built-ins
//! first, then user-configured extras) and reports the category, a
//! confidence score, and the risk level derived from the category.

mod patterns;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PalisadeError, PalisadeResult};
use crate::types::RiskLevel;
use patterns::BUILTIN_PATTERNS;

/// Category of sensitive content a path may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveType {
    /// Environment variable files (.env and variants)
    EnvironmentFile,
    /// Stored credentials (cloud, registry, git)
    CredentialsFile,
    /// Private key material
    PrivateKey,
    /// Certificates and keystores
    Certificate,
    /// Password stores and hashes
    PasswordFile,
    /// API tokens and auth caches
    TokenFile,
    /// Configuration likely to embed secrets
    ConfigWithSecrets,
    /// Database files and dumps
    DatabaseFile,
    /// Backup copies
    BackupFile,
    /// Log output (may leak commands or secrets)
    LogFile,
}

impl SensitiveType {
    /// Snake_case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitiveType::EnvironmentFile => "environment_file",
            SensitiveType::CredentialsFile => "credentials_file",
            SensitiveType::PrivateKey => "private_key",
            SensitiveType::Certificate => "certificate",
            SensitiveType::PasswordFile => "password_file",
            SensitiveType::TokenFile => "token_file",
            SensitiveType::ConfigWithSecrets => "config_with_secrets",
            SensitiveType::DatabaseFile => "database_file",
            SensitiveType::BackupFile => "backup_file",
            SensitiveType::LogFile => "log_file",
        }
    }

    /// Fixed category-to-risk mapping
    pub fn risk_level(&self) -> RiskLevel {
        match self {
            SensitiveType::PrivateKey => RiskLevel::Critical,
            SensitiveType::CredentialsFile => RiskLevel::Critical,
            SensitiveType::PasswordFile => RiskLevel::Critical,
            SensitiveType::TokenFile => RiskLevel::Critical,
            SensitiveType::EnvironmentFile => RiskLevel::High,
            SensitiveType::Certificate => RiskLevel::High,
            SensitiveType::ConfigWithSecrets => RiskLevel::High,
            SensitiveType::DatabaseFile => RiskLevel::Medium,
            SensitiveType::BackupFile => RiskLevel::Medium,
            SensitiveType::LogFile => RiskLevel::Medium,
        }
    }
}

/// Classification outcome for a single path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitiveFileResult {
    /// Whether any pattern matched
    pub is_sensitive: bool,
    /// Matched category, if any
    pub sensitive_type: Option<SensitiveType>,
    /// Pattern specificity in [0, 1]; 0 when nothing matched
    pub confidence: f32,
    /// Human-readable match description
    pub reason: String,
}

impl SensitiveFileResult {
    /// No pattern matched
    pub fn clear() -> Self {
        Self {
            is_sensitive: false,
            sensitive_type: None,
            confidence: 0.0,
            reason: "no sensitive pattern matched".to_string(),
        }
    }

    /// A pattern matched
    pub fn matched(kind: SensitiveType, confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            is_sensitive: true,
            sensitive_type: Some(kind),
            confidence,
            reason: reason.into(),
        }
    }

    /// Risk derived from the matched category (`Low` when clean)
    pub fn risk_level(&self) -> RiskLevel {
        self.sensitive_type
            .map(|kind| kind.risk_level())
            .unwrap_or(RiskLevel::Low)
    }
}

/// Classifies paths by sensitive-content heuristics
///
/// Stateless and cheap to share; the built-in table is a process-wide
/// static, user extras are compiled once at construction.
#[derive(Debug)]
pub struct SensitiveFileDetector {
    user_patterns: Vec<Regex>,
}

impl SensitiveFileDetector {
    /// Compile user-supplied extra patterns on top of the built-in table
    pub fn new(extra_patterns: &[String]) -> PalisadeResult<Self> {
        let mut user_patterns = Vec::with_capacity(extra_patterns.len());
        for pattern in extra_patterns {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|err| PalisadeError::invalid_pattern(pattern, &err))?;
            user_patterns.push(regex);
        }
        Ok(Self { user_patterns })
    }

    /// Classify a path; first matching table entry wins
    ///
    /// Each entry is tried against the basename first, then the full path,
    /// so path-anchored patterns (`.aws/credentials`) work alongside plain
    /// name patterns (`id_rsa`).
    pub fn classify(&self, path: &str) -> SensitiveFileResult {
        let basename = Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        for entry in BUILTIN_PATTERNS.iter() {
            if entry.regex.is_match(&basename) || entry.regex.is_match(path) {
                return SensitiveFileResult::matched(entry.kind, entry.confidence, entry.label);
            }
        }

        for regex in &self.user_patterns {
            if regex.is_match(&basename) || regex.is_match(path) {
                return SensitiveFileResult::matched(
                    SensitiveType::CredentialsFile,
                    0.6,
                    format!("matches configured sensitive pattern '{}'", regex.as_str()),
                );
            }
        }

        SensitiveFileResult::clear()
    }

    /// Risk level for a path via the fixed category mapping
    pub fn risk_level(&self, path: &str) -> RiskLevel {
        self.classify(path).risk_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> SensitiveFileDetector {
        SensitiveFileDetector::new(&[]).unwrap()
    }

    #[test]
    fn test_ssh_key_full_confidence() {
        let result = detector().classify("~/.ssh/id_rsa");
        assert!(result.is_sensitive);
        assert_eq!(result.sensitive_type, Some(SensitiveType::PrivateKey));
        assert!(result.confidence >= 0.9);
    }

    #[test]
    fn test_env_file() {
        let result = detector().classify("/home/user/project/.env.local");
        assert!(result.is_sensitive);
        assert_eq!(result.sensitive_type, Some(SensitiveType::EnvironmentFile));
    }

    #[test]
    fn test_aws_credentials_via_path() {
        let result = detector().classify("/home/user/.aws/credentials");
        assert_eq!(result.sensitive_type, Some(SensitiveType::CredentialsFile));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_clean_path() {
        let result = detector().classify("/home/user/project/src/main.rs");
        assert!(!result.is_sensitive);
        assert_eq!(result.sensitive_type, None);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.risk_level(), RiskLevel::Low);
    }

    #[test]
    fn test_risk_mapping_monotonic() {
        let d = detector();
        let key_risk = d.risk_level("/home/user/.ssh/id_rsa");
        let log_risk = d.risk_level("/var/app/server.log");
        assert_eq!(key_risk, RiskLevel::Critical);
        assert_eq!(log_risk, RiskLevel::Medium);
        assert!(key_risk >= log_risk);
    }

    #[test]
    fn test_generic_secret_substring() {
        let result = detector().classify("/home/user/project/secret-plans.txt");
        assert!(result.is_sensitive);
        assert_eq!(result.confidence, 0.6);
    }

    #[test]
    fn test_idempotent() {
        let d = detector();
        let a = d.classify("/srv/data/backup.bak");
        let b = d.classify("/srv/data/backup.bak");
        assert_eq!(a.sensitive_type, b.sensitive_type);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.reason, b.reason);
    }

    #[test]
    fn test_user_pattern_extension() {
        let d = SensitiveFileDetector::new(&[r"\.vault$".to_string()]).unwrap();
        let result = d.classify("/home/user/team.vault");
        assert!(result.is_sensitive);
        assert_eq!(result.sensitive_type, Some(SensitiveType::CredentialsFile));
        assert_eq!(result.confidence, 0.6);
        assert!(result.reason.contains(".vault"));
    }

    #[test]
    fn test_invalid_user_pattern_errors() {
        let err = SensitiveFileDetector::new(&["(unclosed".to_string()]).unwrap_err();
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_builtin_beats_user_pattern() {
        // A user pattern that would also match id_rsa must not shadow the
        // typed built-in entry
        let d = SensitiveFileDetector::new(&["id_.*".to_string()]).unwrap();
        let result = d.classify("id_rsa");
        assert_eq!(result.sensitive_type, Some(SensitiveType::PrivateKey));
        assert_eq!(result.confidence, 1.0);
    }
}
