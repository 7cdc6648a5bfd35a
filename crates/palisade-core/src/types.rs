//! Shared types for risk scoring and permission policy levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk level of an action or finding
///
/// Ordering follows declaration order: `Low < Medium < High < Critical`.
/// Combined findings always take the maximum, so folding more checks into a
/// decision can only raise risk, never lower it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Safe operation, minimal impact
    #[default]
    Low,
    /// Noteworthy operation, reversible impact
    Medium,
    /// Potentially destructive or privacy-sensitive operation
    High,
    /// Irreversible or security-breaking operation
    Critical,
}

impl RiskLevel {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low risk - safe operation",
            RiskLevel::Medium => "Medium risk - review recommended",
            RiskLevel::High => "High risk - confirmation required",
            RiskLevel::Critical => "Critical risk - potentially irreversible",
        }
    }

    /// Whether this level warrants user confirmation under non-strict policy
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, RiskLevel::Medium | RiskLevel::High)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Policy level a rule (or the config default) assigns to a request
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// Proceed without asking
    Allow,
    /// Proceed only after user confirmation
    #[default]
    Ask,
    /// Refuse outright
    Deny,
}

impl PermissionLevel {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::Allow => "allow",
            PermissionLevel::Ask => "ask",
            PermissionLevel::Deny => "deny",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_risk_max_fold() {
        let folded = RiskLevel::Low.max(RiskLevel::High).max(RiskLevel::Medium);
        assert_eq!(folded, RiskLevel::High);
    }

    #[test]
    fn test_confirmation_band() {
        assert!(!RiskLevel::Low.requires_confirmation());
        assert!(RiskLevel::Medium.requires_confirmation());
        assert!(RiskLevel::High.requires_confirmation());
        // Critical is denied outright rather than confirmed
        assert!(!RiskLevel::Critical.requires_confirmation());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&RiskLevel::Critical).unwrap(), "\"critical\"");
        assert_eq!(serde_json::to_string(&PermissionLevel::Ask).unwrap(), "\"ask\"");
        let level: PermissionLevel = serde_json::from_str("\"deny\"").unwrap();
        assert_eq!(level, PermissionLevel::Deny);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(RiskLevel::default(), RiskLevel::Low);
        assert_eq!(PermissionLevel::default(), PermissionLevel::Ask);
    }
}
