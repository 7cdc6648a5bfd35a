//! Built-in dangerous-command pattern tables, one per category.
//!
//! Every regex runs against the whole raw command string, case-insensitively
//! and without shell tokenization, so payloads hidden in pipelines or
//! substitutions are still seen. Severity is per pattern; the category comes
//! from the table a match belongs to.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

use super::DangerCategory;
use crate::types::RiskLevel;

/// One category's worth of patterns
pub(crate) struct PatternTable {
    pub category: DangerCategory,
    pub entries: Vec<(Regex, RiskLevel)>,
}

fn danger(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap()
}

pub(crate) static BUILTIN_TABLES: LazyLock<Vec<PatternTable>> = LazyLock::new(|| {
    use DangerCategory::*;
    use RiskLevel::*;
    vec![
        PatternTable {
            category: FileDestruction,
            entries: vec![
                // recursive force removal aimed at root, home, or everything
                (danger(r"\brm\s+-[a-z]*[rf][a-z]*[rf][a-z]*\s+(/(\s|$)|/\*|~(/|\s|$)|\$home)"), Critical),
                (danger(r"\brm\s+(-[a-z]+\s+)*--no-preserve-root"), Critical),
                (danger(r"\brm\s+-[a-z]*[rf][a-z]*[rf][a-z]*\b"), High),
                (danger(r"\bdd\s+[^|;]*\bof=/dev/(sd|hd|nvme|vd|xvd)"), Critical),
                (danger(r">\s*/dev/(sd|hd|nvme|vd|xvd)[a-z0-9]*\b"), Critical),
                (danger(r"\b(mkfs(\.\w+)?|wipefs|shred)\b"), Critical),
                (danger(r"\bmv\s+[^|;]*\s+/dev/null"), High),
            ],
        },
        PatternTable {
            category: PermissionEscalation,
            entries: vec![
                (danger(r"/etc/sudoers"), Critical),
                (danger(r"\b(sudo|doas|pkexec)\b"), High),
                (danger(r"\bsu\s+(-|root\b)"), High),
                (danger(r"\bchmod\s+([ugoa]*\+s\b|[42][0-7]{3}\b)"), High),
                (danger(r"\bsetenforce\s+0\b"), High),
                (danger(r"\bnsenter\b"), High),
            ],
        },
        PatternTable {
            category: CredentialExposure,
            entries: vec![
                (danger(r"/etc/shadow"), Critical),
                (danger(r"\b(cat|less|more|head|tail|cp|scp)\s+[^|;]*\.ssh/id_"), Critical),
                (danger(r"/etc/passwd"), High),
                (danger(r"\b(cat|less|more|head|tail)\s+[^|;]*\.(pem|key)\b"), High),
                (danger(r"\b(printenv|env)\s*($|\|)"), Medium),
                (danger(r"\b(grep|rg|find)\s+[^|;]*(password|secret|api[_-]?key)"), Medium),
            ],
        },
        PatternTable {
            category: NetworkAttack,
            entries: vec![
                (danger(r"\bnc\s+[^|;]*-[a-z]*e\b"), Critical),
                (danger(r"\bbash\s+-i\s+>&\s*/dev/tcp/"), Critical),
                (danger(r"\bsocat\s+[^|;]*exec"), Critical),
                (danger(r"/dev/(tcp|udp)/"), High),
                (danger(r"\b(python[23]?|perl|ruby|php)\b[^|;]*\bsocket\b"), High),
                (danger(r"\b(hping3?|masscan)\b"), High),
                (danger(r"\bnmap\b"), Medium),
            ],
        },
        PatternTable {
            category: CodeInjection,
            entries: vec![
                (danger(r"\b(curl|wget)\b[^|;]*\|\s*(env\s+)?(ba|z|da)?sh\b"), Critical),
                (danger(r"\$\(\s*(curl|wget)\b[^)]*\)"), Critical),
                (danger(r"\bbase64\s+(-d|--decode)\b[^|;]*\|\s*(ba)?sh\b"), Critical),
                (danger(r"\bsource\s+/dev/stdin"), High),
                (danger(r"\beval\s"), High),
                (danger(r"\b(bash|sh|zsh|fish|csh|tcsh|ksh)\s+-c\s"), Medium),
                (danger(r"`[^`]+`"), Low),
            ],
        },
        PatternTable {
            category: DataExfiltration,
            entries: vec![
                (danger(r"\btar\s+[^|;]*(/home|/etc|~)[^|;]*\|\s*(curl|nc|ssh)\b"), Critical),
                (danger(r"\bbase64\s+[^|;]*\|\s*(curl|wget|nc)\b"), Critical),
                (danger(r"\b(cat|dd)\s+[^|;]*\|\s*(nc|curl|ssh)\b"), High),
                (danger(r"\b(curl|wget)\s+[^|;]*(--data\b|--upload-file\b|-d\s|-T\s|-F\s)"), High),
                (danger(r"\b(scp|rsync)\s+[^|;]*@"), Medium),
            ],
        },
        PatternTable {
            category: SystemModification,
            entries: vec![
                (danger(r">\s*/etc/"), High),
                (danger(r"\b(iptables|nft)\s+(-F\b|flush)"), High),
                (danger(r"\bufw\s+disable\b"), High),
                (danger(r"\bsystemctl\s+(stop|disable|mask)\s+(firewalld|ufw|apparmor)"), High),
                (danger(r"\b(insmod|rmmod|modprobe)\b"), High),
                (danger(r"\b(shutdown|reboot|halt|poweroff)\b"), High),
                (danger(r"\bcrontab\s+-r\b"), High),
                (danger(r"\bsysctl\s+-w\b"), Medium),
                (danger(r"\b(apt(-get)?|yum|dnf|pacman|apk|brew)\s+(install|remove|purge)\b"), Medium),
            ],
        },
        PatternTable {
            category: ProcessManipulation,
            entries: vec![
                (danger(r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:"), Critical),
                (danger(r"\bkill\s+-9\s+(-1|1)\b"), Critical),
                (danger(r"\b(killall|pkill)\s"), High),
                (danger(r"\bkill\s+"), Medium),
                (danger(r"\b(nohup|disown)\b"), Low),
            ],
        },
    ]
});
