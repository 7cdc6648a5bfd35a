//! TTL cache for permission decisions.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::trace;

use super::PermissionResult;

struct CacheEntry {
    result: PermissionResult,
    inserted_at: Instant,
}

/// Keyed decision cache with lazy expiry.
///
/// A zero TTL disables caching entirely; expired entries are dropped on
/// lookup rather than swept in the background.
pub(crate) struct DecisionCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl DecisionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<PermissionResult> {
        if self.ttl.is_zero() {
            return None;
        }
        {
            let entries = self.entries.read();
            let entry = entries.get(key)?;
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.result.clone());
            }
        }
        trace!(key, "expired cache entry dropped");
        self.entries.write().remove(key);
        None
    }

    pub fn insert(&self, key: String, result: PermissionResult) {
        if self.ttl.is_zero() {
            return;
        }
        trace!(key = key.as_str(), "decision cached");
        self.entries.write().insert(
            key,
            CacheEntry {
                result,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        let entries = self.entries.read();
        if self.ttl.is_zero() {
            return 0;
        }
        entries
            .values()
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .count()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
