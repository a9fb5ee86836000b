//! Core types shared by the registry, router and store bridge.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Transport-internal event names. These skip the decrypt gate and are never
/// forwarded to the store.
pub const EXCLUDED_EVENTS: [&str; 16] = [
    "connect",
    "connecting",
    "connect_error",
    "connect_timeout",
    "reconnect",
    "reconnect_attempt",
    "reconnecting",
    "reconnect_error",
    "reconnect_failed",
    "disconnect",
    "disconnecting",
    "error",
    "newListener",
    "removeListener",
    "ping",
    "pong",
];

/// Whether `event` is a transport lifecycle or heartbeat signal.
pub fn is_excluded(event: &str) -> bool {
    EXCLUDED_EVENTS.contains(&event)
}

static NEXT_SUBSCRIBER: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of whoever owns a set of listeners.
///
/// Equality is by a process-unique id; the label only shows up in logs.
/// Clones compare equal, two calls to [`SubscriberId::new`] never do.
#[derive(Clone)]
pub struct SubscriberId {
    id: u64,
    label: Arc<str>,
}

impl SubscriberId {
    /// Allocate a fresh identity.
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self {
            id: NEXT_SUBSCRIBER.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for SubscriberId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SubscriberId {}

impl std::hash::Hash for SubscriberId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriberId({}#{})", self.label, self.id)
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}
