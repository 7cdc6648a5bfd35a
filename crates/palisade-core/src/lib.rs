//! Palisade core: permission and path-safety decisions for tool-running
//! agents.
//!
//! An agent that can touch the filesystem or a shell needs a gate in front
//! of every action. This crate is that gate: callers describe an intended
//! action as a [`PermissionRequest`] and receive a [`PermissionResult`]
//! stating whether it may proceed, whether an operator has to confirm it
//! first, and why.
//!
//! The decision combines four layers:
//!
//! - [`PathValidator`] runs path targets through normalization, traversal
//!   detection, depth limits, directory policy, and symlink escape checks
//! - [`SensitiveFileDetector`] classifies paths that look like key material,
//!   credentials, or other secrets
//! - [`CommandDangerAnalyzer`] scans command targets for destructive or
//!   malicious shell constructs
//! - [`PermissionManager`] resolves declarative rules, dispatches the target
//!   to the right analyzer, folds everything into one decision, and records
//!   it as an event
//!
//! ```
//! use palisade_core::{PermissionManager, PermissionRequest};
//!
//! let manager = PermissionManager::builder()
//!     .base_dir("/workspace")
//!     .build()
//!     .unwrap();
//!
//! let request = PermissionRequest::new("shell", "exec").with_target("rm -rf /");
//! let decision = manager.check(&request);
//! assert!(!decision.allowed);
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod path;
pub mod permission;
pub mod sensitive;
pub mod types;

// Re-export commonly used types
pub use command::{CommandAnalysisResult, CommandDangerAnalyzer, DangerCategory, DangerousPattern};
pub use config::PermissionConfig;
pub use error::{PalisadeError, PalisadeResult};
pub use path::{
    CheckStage, DirectoryPolicy, PathValidationResult, PathValidator, SharedDirectoryPolicy,
    ValidationWarning, WarningSeverity,
};
pub use permission::{
    EventHandler, EventKind, EventStore, EventSummary, PermissionEvent, PermissionManager,
    PermissionManagerBuilder, PermissionRequest, PermissionResult, PermissionRule,
    SharedEventHandler, TracingEventHandler,
};
pub use sensitive::{SensitiveFileDetector, SensitiveFileResult, SensitiveType};
pub use types::{PermissionLevel, RiskLevel};
