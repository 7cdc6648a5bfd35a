//! Symlink-escape detection.
//!
//! Walks the ancestor chain of a normalized path from the root end toward
//! the leaf and resolves every symlinked ancestor to its real target. The
//! walk operates on an owned snapshot of the chain; nothing here mutates
//! shared state.

use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::DirectoryPolicy;

/// Outcome of the symlink walk
#[derive(Debug)]
pub(crate) enum SymlinkOutcome {
    /// No symlinked ancestor leaves the permitted set
    Clean,
    /// A component does not exist yet; deeper components were not checked
    Incomplete,
    /// A symlinked ancestor resolves outside the permitted set
    Escape {
        link: PathBuf,
        target: PathBuf,
        into_blocked: bool,
    },
}

/// Resolve each symlinked ancestor and re-check it against the policy
///
/// Probe failures other than "not found" default to allowing: an
/// unverifiable link is logged and skipped, the structural checks that ran
/// before this stage still gate the decision.
pub(crate) fn walk_symlinks(normalized: &Path, policy: &DirectoryPolicy) -> SymlinkOutcome {
    let chain: Vec<PathBuf> = normalized.ancestors().map(Path::to_path_buf).collect();

    for node in chain.iter().rev() {
        if node.as_os_str().is_empty() {
            continue;
        }

        let meta = match node.symlink_metadata() {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return SymlinkOutcome::Incomplete;
            }
            Err(err) => {
                warn!(
                    path = %node.display(),
                    error = %err,
                    "symlink probe failed; treating component as verified"
                );
                continue;
            }
        };

        if !meta.file_type().is_symlink() {
            continue;
        }

        let target = match node.canonicalize() {
            Ok(target) => target,
            Err(err) => {
                warn!(
                    path = %node.display(),
                    error = %err,
                    "symlink target unresolvable; treating component as verified"
                );
                continue;
            }
        };

        if policy.is_blocked(&target) {
            return SymlinkOutcome::Escape {
                link: node.clone(),
                target,
                into_blocked: true,
            };
        }
        if !policy.allows(&target) {
            return SymlinkOutcome::Escape {
                link: node.clone(),
                target,
                into_blocked: false,
            };
        }
    }

    SymlinkOutcome::Clean
}
