//! Default directory lists and configuration constants.

use std::path::PathBuf;
use std::time::Duration;

/// Default blocked directories (system locations an agent should not touch)
pub fn default_blocked_dirs() -> Vec<PathBuf> {
    vec![
        // System configuration
        PathBuf::from("/etc"),
        // Kernel and device interfaces
        PathBuf::from("/sys"),
        PathBuf::from("/proc"),
        PathBuf::from("/dev"),
        // Boot loader and kernels
        PathBuf::from("/boot"),
        // Superuser home
        PathBuf::from("/root"),
        // System binaries
        PathBuf::from("/sbin"),
        PathBuf::from("/usr/sbin"),
    ]
}

/// Minimal blocked set kept even in permissive mode
pub fn minimal_blocked_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/sys"),
        PathBuf::from("/proc"),
        PathBuf::from("/boot"),
    ]
}

pub fn default_max_path_depth() -> usize {
    20
}

pub fn default_cache_ttl() -> Duration {
    Duration::from_secs(300)
}

pub fn default_max_events() -> usize {
    1000
}

/// Base directory for resolving relative request paths
pub fn default_base_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"))
}
