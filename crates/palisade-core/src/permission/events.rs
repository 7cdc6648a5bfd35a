//! Decision events, their bounded in-memory store, and the observer seam.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

use super::request::PermissionRequest;
use super::PermissionResult;

/// What kind of decision an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Served from the decision cache
    Check,
    /// Fresh decision, allowed without confirmation
    Grant,
    /// Fresh decision, rejected
    Deny,
    /// Fresh decision, allowed pending confirmation
    Confirm,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Check => "check",
            EventKind::Grant => "grant",
            EventKind::Deny => "deny",
            EventKind::Confirm => "confirm",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded permission decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionEvent {
    pub kind: EventKind,
    #[serde(with = "system_time_serde")]
    pub timestamp: SystemTime,
    pub request: PermissionRequest,
    pub result: PermissionResult,
}

impl PermissionEvent {
    pub fn new(kind: EventKind, request: PermissionRequest, result: PermissionResult) -> Self {
        Self {
            kind,
            timestamp: SystemTime::now(),
            request,
            result,
        }
    }
}

/// Serialize SystemTime as seconds since the Unix epoch
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let secs = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        secs.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_secs(secs))
    }
}

/// Aggregate counts over everything ever recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventSummary {
    /// Total events recorded, including any evicted from the buffer
    pub total: usize,
    pub by_kind: HashMap<EventKind, usize>,
}

/// Bounded in-memory event log.
///
/// Keeps at most `max_events` events, evicting the oldest first; kind counts
/// are cumulative and survive eviction. `max_events` of zero means unbounded.
pub struct EventStore {
    events: RwLock<Vec<PermissionEvent>>,
    counts: RwLock<HashMap<EventKind, usize>>,
    max_events: usize,
}

impl EventStore {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            counts: RwLock::new(HashMap::new()),
            max_events,
        }
    }

    pub fn record(&self, event: PermissionEvent) {
        *self.counts.write().entry(event.kind).or_insert(0) += 1;
        let mut events = self.events.write();
        events.push(event);
        if self.max_events > 0 && events.len() > self.max_events {
            let excess = events.len() - self.max_events;
            events.drain(..excess);
        }
    }

    /// The most recent `limit` events, oldest first
    pub fn recent(&self, limit: usize) -> Vec<PermissionEvent> {
        let events = self.events.read();
        let start = events.len().saturating_sub(limit);
        events[start..].to_vec()
    }

    pub fn get_by_kind(&self, kind: EventKind) -> Vec<PermissionEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| event.kind == kind)
            .cloned()
            .collect()
    }

    /// Every denial still held in the buffer
    pub fn denials(&self) -> Vec<PermissionEvent> {
        self.get_by_kind(EventKind::Deny)
    }

    pub fn summary(&self) -> EventSummary {
        let counts = self.counts.read();
        EventSummary {
            total: counts.values().sum(),
            by_kind: counts.clone(),
        }
    }

    /// Events currently buffered (evicted ones excluded)
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    pub fn clear(&self) {
        self.events.write().clear();
        self.counts.write().clear();
    }
}

/// Receives every event as it is recorded.
///
/// Handlers run synchronously on the deciding thread; a panicking handler is
/// isolated and never alters the decision.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &PermissionEvent);
}

/// Shared handle to an event handler
pub type SharedEventHandler = Arc<dyn EventHandler>;

/// Forwards events to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingEventHandler;

impl EventHandler for TracingEventHandler {
    fn on_event(&self, event: &PermissionEvent) {
        match event.kind {
            EventKind::Deny => warn!(
                tool = event.request.tool,
                action = event.request.action,
                target = event.request.target.as_deref().unwrap_or("-"),
                risk = %event.result.risk_level,
                reason = event.result.reason,
                "permission denied"
            ),
            EventKind::Confirm => info!(
                tool = event.request.tool,
                action = event.request.action,
                target = event.request.target.as_deref().unwrap_or("-"),
                risk = %event.result.risk_level,
                "permission granted pending confirmation"
            ),
            EventKind::Grant | EventKind::Check => debug!(
                tool = event.request.tool,
                action = event.request.action,
                kind = %event.kind,
                "permission granted"
            ),
        }
    }
}
