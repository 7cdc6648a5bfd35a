//! Safer-alternative suggestions, keyed by danger category.

use super::DangerCategory;

/// Suggestions surfaced alongside a dangerous-command detection.
pub(crate) fn alternatives_for(category: DangerCategory) -> &'static [&'static str] {
    match category {
        DangerCategory::FileDestruction => &[
            "move the target into a trash or backup directory instead of deleting in place",
            "scope the deletion to an explicit project subdirectory",
        ],
        DangerCategory::PermissionEscalation => &[
            "run the command without privilege escalation",
            "ask the operator to perform the privileged step",
        ],
        DangerCategory::CredentialExposure => &[
            "reference secrets through environment variables or a secret manager",
            "redact credential material before it reaches logs or output",
        ],
        DangerCategory::NetworkAttack => &[
            "connect only to an explicitly allow-listed host and port",
            "use an application-level client instead of raw sockets",
        ],
        DangerCategory::CodeInjection => &[
            "download to a file, inspect it, then run the inspected copy",
            "call the command directly instead of using eval",
        ],
        DangerCategory::DataExfiltration => &[
            "write the archive locally and let the operator decide what leaves the machine",
        ],
        DangerCategory::SystemModification => &[
            "keep changes inside project-local files",
            "route system changes through reviewed configuration management",
        ],
        DangerCategory::ProcessManipulation => &[
            "target a specific process id owned by this session",
            "stop services through their supervisor",
        ],
    }
}
