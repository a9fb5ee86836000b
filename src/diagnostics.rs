//! Injected diagnostics sink.
//!
//! The router and registry never log directly; they hand a [`Diagnostic`] to
//! whatever [`Diagnostics`] implementation they were built with. The default,
//! [`TracingDiagnostics`], turns each one into a `tracing` event.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Something worth reporting about relay activity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Emitted once when a router is built.
    AdapterStatus {
        store: bool,
        actions: bool,
        mutations: bool,
    },

    Subscribed {
        event: String,
        owner: String,
    },

    Unsubscribed {
        event: String,
        owner: String,
        removed: usize,
    },

    /// An event is about to be fanned out.
    Broadcast {
        event: String,
        encrypted: bool,
        listeners: usize,
    },

    /// Decrypt gate saw an object with keys other than the encrypted field.
    /// The original payload is delivered.
    BodyRejected {
        event: String,
        unexpected_keys: Vec<String>,
    },

    /// A listener panicked or returned an error.
    ListenerFailed {
        event: String,
        owner: String,
        error: String,
    },

    /// A listener reported itself closed and was removed.
    ListenerPruned {
        event: String,
        owner: String,
    },

    /// A channel subscriber's queue was full; the payload was dropped for it.
    ChannelOverflow {
        event: String,
        owner: String,
    },

    ActionDispatched {
        name: String,
    },

    MutationCommitted {
        name: String,
    },
}

/// Sink for relay diagnostics.
pub trait Diagnostics: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Default sink: structured `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::AdapterStatus {
                store,
                actions,
                mutations,
            } => {
                info!(store, actions, mutations, "store adapter status");
            }
            Diagnostic::Subscribed { event, owner } => {
                info!(%event, %owner, "subscribe");
            }
            Diagnostic::Unsubscribed {
                event,
                owner,
                removed,
            } => {
                info!(%event, %owner, removed, "unsubscribe");
            }
            Diagnostic::Broadcast {
                event,
                encrypted,
                listeners,
            } => {
                debug!(%event, encrypted, listeners, "broadcasting");
            }
            Diagnostic::BodyRejected {
                event,
                unexpected_keys,
            } => {
                warn!(
                    %event,
                    keys = ?unexpected_keys,
                    "couldn't decrypt, unacceptable request body sent"
                );
            }
            Diagnostic::ListenerFailed {
                event,
                owner,
                error,
            } => {
                warn!(%event, %owner, %error, "listener failed");
            }
            Diagnostic::ListenerPruned { event, owner } => {
                debug!(%event, %owner, "closed listener removed");
            }
            Diagnostic::ChannelOverflow { event, owner } => {
                warn!(%event, %owner, "channel subscriber full, payload dropped");
            }
            Diagnostic::ActionDispatched { name } => {
                info!(action = %name, "dispatching action");
            }
            Diagnostic::MutationCommitted { name } => {
                info!(mutation = %name, "committing mutation");
            }
        }
    }
}

/// Sink that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().clone()
    }

    /// Drain the recorded diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn emit(&self, diagnostic: Diagnostic) {
        self.events.lock().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_take_drains() {
        let sink = RecordingDiagnostics::new();
        sink.emit(Diagnostic::ActionDispatched {
            name: "chat/SOCKET_message".to_string(),
        });
        assert_eq!(sink.events().len(), 1);
        assert_eq!(sink.take().len(), 1);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_diagnostic_serializes_tagged() {
        let json = serde_json::to_value(Diagnostic::BodyRejected {
            event: "message".to_string(),
            unexpected_keys: vec!["other".to_string()],
        })
        .unwrap();
        assert_eq!(json["type"], "body_rejected");
        assert_eq!(json["unexpected_keys"][0], "other");
    }
}
