//! Built-in sensitive-file pattern table.
//!
//! Ordered most-specific first; the detector stops at the first entry whose
//! regex matches either the basename or the full path. Confidence reflects
//! pattern specificity: exact names score 1.0, generic substrings 0.6.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

use super::SensitiveType;

/// One row of the detection table
pub(crate) struct SensitiveEntry {
    pub regex: Regex,
    pub kind: SensitiveType,
    pub confidence: f32,
    pub label: &'static str,
}

fn entry(pattern: &str, kind: SensitiveType, confidence: f32, label: &'static str) -> SensitiveEntry {
    SensitiveEntry {
        regex: RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .unwrap(),
        kind,
        confidence,
        label,
    }
}

pub(crate) static BUILTIN_PATTERNS: LazyLock<Vec<SensitiveEntry>> = LazyLock::new(|| {
    use SensitiveType::*;
    vec![
        // Exact names, unambiguous
        entry(r"^id_(rsa|dsa|ecdsa|ed25519)$", PrivateKey, 1.0, "SSH private key"),
        entry(r"(^|/)\.aws/credentials$", CredentialsFile, 1.0, "AWS credentials file"),
        entry(r"^\.git-credentials$", CredentialsFile, 1.0, "stored git credentials"),
        entry(r"^\.netrc$", CredentialsFile, 1.0, "netrc login file"),
        entry(r"^\.env(\..+)?$", EnvironmentFile, 0.95, "environment file"),
        entry(r"^master\.key$", PasswordFile, 0.95, "application master key"),
        entry(r"^\.htpasswd$", PasswordFile, 0.95, "htpasswd file"),
        entry(r"\.kdbx$", PasswordFile, 0.95, "KeePass database"),
        // Key material and certificates by extension
        entry(r"\.(pem|key)$", PrivateKey, 0.9, "PEM/key file"),
        entry(r"\.(p12|pfx|jks|keystore)$", Certificate, 0.85, "certificate keystore"),
        entry(r"\.(crt|cer|der)$", Certificate, 0.85, "certificate file"),
        // Well-known credential locations
        entry(r"(^|/)\.kube/config$", CredentialsFile, 0.9, "kubeconfig"),
        entry(r"^kubeconfig$", CredentialsFile, 0.9, "kubeconfig"),
        entry(r"^shadow$", CredentialsFile, 0.9, "system shadow file"),
        entry(r"(^|/)\.docker/config\.json$", TokenFile, 0.85, "docker auth config"),
        entry(
            r"^service[-_]?account.*\.json$",
            CredentialsFile,
            0.8,
            "cloud service-account key",
        ),
        entry(r"^\.(npmrc|pypirc)$", CredentialsFile, 0.8, "registry auth file"),
        entry(
            r"^\.(bash_history|zsh_history|history|psql_history|mysql_history)$",
            LogFile,
            0.8,
            "shell history",
        ),
        entry(r"(^|/)\.ssh(/|$)", PrivateKey, 0.7, "SSH directory contents"),
        // Infrastructure state and secret-bearing configs
        entry(r"\.tfstate(\.backup)?$", ConfigWithSecrets, 0.85, "terraform state"),
        entry(
            r"^secrets?\.(ya?ml|json|toml|properties)$",
            ConfigWithSecrets,
            0.85,
            "secrets config file",
        ),
        entry(r"\.tfvars$", ConfigWithSecrets, 0.75, "terraform variables"),
        entry(r"^passwd$", PasswordFile, 0.7, "passwd file"),
        // Data, backups, logs
        entry(r"\.(sqlite3?|db)$", DatabaseFile, 0.7, "database file"),
        entry(r"\.sql$", DatabaseFile, 0.5, "SQL dump"),
        entry(r"\.log(\.\d+)?$", LogFile, 0.6, "log file"),
        entry(r"\.(bak|backup|old|orig)$", BackupFile, 0.6, "backup file"),
        entry(r"~$", BackupFile, 0.5, "editor backup"),
        // Generic substrings, weakest signal last
        entry(r"password", PasswordFile, 0.7, "filename mentions password"),
        entry(r"credential", CredentialsFile, 0.6, "filename mentions credentials"),
        entry(r"secret", ConfigWithSecrets, 0.6, "filename mentions secret"),
        entry(r"token", TokenFile, 0.6, "filename mentions token"),
    ]
});
