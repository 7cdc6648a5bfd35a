//! Permission decisions for tool actions.
//!
//! [`PermissionManager`] is the entry point: it resolves a declarative rule,
//! dispatches the request target to path validation or command analysis,
//! folds everything into a [`PermissionResult`], and records the decision as
//! an event. Sub-modules stay private; the public surface is re-exported
//! here.

mod cache;
mod events;
mod manager;
mod request;
mod rules;


pub use events::{
    EventHandler, EventKind, EventStore, EventSummary, PermissionEvent, SharedEventHandler,
    TracingEventHandler,
};
pub use manager::{PermissionManager, PermissionManagerBuilder};
pub use request::{PermissionRequest, PermissionResult};
pub use rules::PermissionRule;

pub(crate) use cache::DecisionCache;
pub(crate) use request::TargetKind;
pub(crate) use rules::RuleEngine;
