//! Pure lexical path normalization.
//!
//! No filesystem access happens here; traversal intent must stay detectable
//! on both the raw and the resolved form, so `..` resolution is string
//! algebra only.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Why a raw input could not be normalized
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum NormalizeError {
    #[error("path is empty")]
    Empty,
    #[error("path contains a NUL byte")]
    NulByte,
}

/// Resolve a raw input against the base directory and collapse it lexically
///
/// Relative inputs are joined onto `base` (which the config guarantees is
/// absolute); `.` segments, repeated separators, and trailing separators
/// disappear; `..` segments resolve upward without consulting the disk.
pub(crate) fn normalize(raw: &str, base: &Path) -> Result<PathBuf, NormalizeError> {
    if raw.is_empty() {
        return Err(NormalizeError::Empty);
    }
    if raw.contains('\0') {
        return Err(NormalizeError::NulByte);
    }

    let candidate = Path::new(raw);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    };
    Ok(collapse(&joined))
}

/// Collapse `.` and `..` components without touching the filesystem
///
/// `..` at the root stays at the root (popping `/` is a no-op), matching
/// how the kernel resolves `/..`.
pub(crate) fn collapse(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(segment) => out.push(segment),
        }
    }
    out
}

/// Count the non-empty segments of a normalized path
pub(crate) fn depth(path: &Path) -> usize {
    path.components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .count()
}
