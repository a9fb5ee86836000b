//! Registry of listeners keyed by event name.

use crate::diagnostics::{Diagnostic, Diagnostics, TracingDiagnostics};
use crate::error::{RelayError, Result};
use crate::types::SubscriberId;
use crossbeam_channel::{bounded, TrySendError};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::types::{
    callback, Callback, ChannelSubscription, ListenerClosed, ListenerEntry, ListenerResult,
};

/// Maps event names to their listeners, in registration order.
///
/// A key is present only while it has at least one listener.
pub struct SubscriptionRegistry {
    listeners: RwLock<HashMap<String, Vec<ListenerEntry>>>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl SubscriptionRegistry {
    /// Create a registry that reports through `tracing`.
    pub fn new() -> Self {
        Self::with_diagnostics(Arc::new(TracingDiagnostics))
    }

    pub fn with_diagnostics(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            diagnostics,
        }
    }

    /// Register `callback` for `event` on behalf of `owner`.
    ///
    /// No deduplication: registering twice means being called twice.
    pub fn subscribe<F>(&self, event: &str, callback_fn: F, owner: &SubscriberId)
    where
        F: Fn(&Value) -> ListenerResult + Send + Sync + 'static,
    {
        self.insert(event, callback(callback_fn), owner);
    }

    /// Register a callback handed over at runtime, which may be missing.
    pub fn subscribe_handler(
        &self,
        event: &str,
        handler: Option<Callback>,
        owner: &SubscriberId,
    ) -> Result<()> {
        let handler = handler.ok_or_else(|| RelayError::InvalidCallback {
            event: event.to_string(),
        })?;
        self.insert(event, handler, owner);
        Ok(())
    }

    /// Register a listener that queues payloads into a bounded channel.
    ///
    /// When the queue is full the payload is dropped for this subscriber only.
    /// Once the returned handle is dropped the listener reports itself closed.
    pub fn subscribe_channel(
        &self,
        event: &str,
        owner: &SubscriberId,
        capacity: usize,
    ) -> ChannelSubscription {
        let (sender, receiver) = bounded(capacity);
        let diagnostics = Arc::clone(&self.diagnostics);
        let event_name = event.to_string();
        let owner_label = owner.to_string();

        self.subscribe(
            event,
            move |payload| match sender.try_send(payload.clone()) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => {
                    diagnostics.emit(Diagnostic::ChannelOverflow {
                        event: event_name.clone(),
                        owner: owner_label.clone(),
                    });
                    Ok(())
                }
                Err(TrySendError::Disconnected(_)) => Err(ListenerClosed.into()),
            },
            owner,
        );

        ChannelSubscription {
            owner: owner.clone(),
            event: event.to_string(),
            receiver,
        }
    }

    fn insert(&self, event: &str, callback: Callback, owner: &SubscriberId) {
        self.listeners
            .write()
            .entry(event.to_string())
            .or_default()
            .push(ListenerEntry::new(callback, owner.clone()));

        self.diagnostics.emit(Diagnostic::Subscribed {
            event: event.to_string(),
            owner: owner.to_string(),
        });
    }

    /// Remove every listener `owner` has on `event`. Returns how many went.
    ///
    /// Unknown events or owners are a no-op.
    pub fn unsubscribe(&self, event: &str, owner: &SubscriberId) -> usize {
        let removed = {
            let mut listeners = self.listeners.write();
            let Some(entries) = listeners.get_mut(event) else {
                return 0;
            };
            let before = entries.len();
            entries.retain(|entry| entry.owner() != owner);
            let removed = before - entries.len();
            if entries.is_empty() {
                listeners.remove(event);
            }
            removed
        };

        self.diagnostics.emit(Diagnostic::Unsubscribed {
            event: event.to_string(),
            owner: owner.to_string(),
            removed,
        });
        removed
    }

    /// Remove `owner` from every event, e.g. when it is torn down.
    pub fn unsubscribe_all(&self, owner: &SubscriberId) -> usize {
        let mut touched = Vec::new();
        {
            let mut listeners = self.listeners.write();
            listeners.retain(|event, entries| {
                let before = entries.len();
                entries.retain(|entry| entry.owner() != owner);
                if entries.len() != before {
                    touched.push((event.clone(), before - entries.len()));
                }
                !entries.is_empty()
            });
        }

        let mut total = 0;
        for (event, removed) in touched {
            total += removed;
            self.diagnostics.emit(Diagnostic::Unsubscribed {
                event,
                owner: owner.to_string(),
                removed,
            });
        }
        total
    }

    /// Remove exactly the given entries from `event`, leaving the rest of
    /// their owners' listeners in place. Returns the entries that were still
    /// registered.
    pub(crate) fn remove_entries(
        &self,
        event: &str,
        closed: &[ListenerEntry],
    ) -> Vec<ListenerEntry> {
        if closed.is_empty() {
            return Vec::new();
        }

        let mut listeners = self.listeners.write();
        let Some(entries) = listeners.get_mut(event) else {
            return Vec::new();
        };
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(entries)
            .into_iter()
            .partition(|entry| closed.iter().any(|gone| gone.same_entry(entry)));
        *entries = kept;
        if entries.is_empty() {
            listeners.remove(event);
        }
        removed
    }

    /// Snapshot of the listeners for `event`, in registration order.
    pub fn listeners_for(&self, event: &str) -> Vec<ListenerEntry> {
        self.listeners
            .read()
            .get(event)
            .cloned()
            .unwrap_or_default()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.read().get(event).map_or(0, Vec::len)
    }

    /// Events that currently have listeners, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
