//! Inbound event routing.
//!
//! [`EventRouter::handle`] is the single entry point the transport calls for
//! every named event:
//!
//! ```text
//! transport ──► handle(event, payload)
//!                 ├─ decrypt gate (unless excluded or no secret)
//!                 ├─ fan-out to listeners, registration order
//!                 └─ store bridge (unless excluded)
//! ```
//!
//! A malformed body degrades to delivering the original payload. A failed
//! decryption aborts the event: no listener runs and nothing is forwarded.

mod gate;

pub use gate::{decode_body, BodyDecode};

use gate::is_keyed;

use crate::bridge::{ActionStore, ForwardSummary, StoreBinding, StoreBridge};
use crate::config::{RelayConfig, Secret};
use crate::crypto::{Decryptor, PassphraseAes};
use crate::diagnostics::{Diagnostic, Diagnostics, TracingDiagnostics};
use crate::error::{DecryptError, Result};
use crate::subscriptions::{
    Callback, ChannelSubscription, ListenerFailure, ListenerResult, SubscriptionRegistry,
};
use crate::types::{is_excluded, SubscriberId};
use serde_json::Value;
use std::sync::Arc;

/// Decrypt settings resolved at construction.
struct DecryptGate {
    secret: Secret,
    field: String,
    decryptor: Arc<dyn Decryptor>,
}

/// What happened to one inbound event.
#[derive(Clone, Debug, PartialEq)]
pub struct Delivery {
    pub event: String,
    /// Payload as handed to listeners and the store.
    pub payload: Value,
    /// Payload came out of the decrypt gate.
    pub decrypted: bool,
    /// Decrypt gate refused the body shape; original payload delivered.
    pub body_rejected: bool,
    /// Listeners invoked, failed and closed ones included.
    pub listeners_invoked: usize,
    pub listener_failures: usize,
    /// Closed listeners removed after this fan-out.
    pub listeners_pruned: usize,
    pub forward: ForwardSummary,
}

/// Routes inbound socket events to listeners and the store.
pub struct EventRouter {
    registry: SubscriptionRegistry,
    gate: Option<DecryptGate>,
    bridge: StoreBridge,
    diagnostics: Arc<dyn Diagnostics>,
}

impl EventRouter {
    /// Router without a store, using the bundled decryptor if a secret is set.
    pub fn new(config: RelayConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn decrypts(&self) -> bool {
        self.gate.is_some()
    }

    // --- Subscriber surface ---

    pub fn subscribe<F>(&self, event: &str, callback: F, owner: &SubscriberId)
    where
        F: Fn(&Value) -> ListenerResult + Send + Sync + 'static,
    {
        self.registry.subscribe(event, callback, owner);
    }

    pub fn subscribe_handler(
        &self,
        event: &str,
        handler: Option<Callback>,
        owner: &SubscriberId,
    ) -> Result<()> {
        self.registry.subscribe_handler(event, handler, owner)
    }

    pub fn subscribe_channel(
        &self,
        event: &str,
        owner: &SubscriberId,
        capacity: usize,
    ) -> ChannelSubscription {
        self.registry.subscribe_channel(event, owner, capacity)
    }

    pub fn unsubscribe(&self, event: &str, owner: &SubscriberId) -> usize {
        self.registry.unsubscribe(event, owner)
    }

    pub fn unsubscribe_all(&self, owner: &SubscriberId) -> usize {
        self.registry.unsubscribe_all(owner)
    }

    // --- Inbound ---

    /// Process one inbound event.
    ///
    /// Fails only with [`RelayError::Decryption`](crate::RelayError::Decryption),
    /// in which case nothing was delivered or forwarded.
    pub fn handle(&self, event: &str, payload: Value) -> Result<Delivery> {
        let excluded = is_excluded(event);
        let mut delivery = Delivery {
            event: event.to_string(),
            payload: Value::Null,
            decrypted: false,
            body_rejected: false,
            listeners_invoked: 0,
            listener_failures: 0,
            listeners_pruned: 0,
            forward: ForwardSummary::default(),
        };

        let gate = self
            .gate
            .as_ref()
            .filter(|_| !excluded)
            .filter(|_| is_keyed(&payload));
        let payload = match gate {
            Some(gate) => self.open_gate(gate, event, payload, &mut delivery)?,
            None => payload,
        };

        let listeners = self.registry.listeners_for(event);
        self.diagnostics.emit(Diagnostic::Broadcast {
            event: event.to_string(),
            encrypted: gate.is_some(),
            listeners: listeners.len(),
        });

        let mut closed = Vec::new();
        for entry in &listeners {
            delivery.listeners_invoked += 1;
            match entry.invoke(&payload) {
                Ok(()) => {}
                Err(ListenerFailure::Closed) => closed.push(entry.clone()),
                Err(ListenerFailure::Failed(error)) => {
                    delivery.listener_failures += 1;
                    self.diagnostics.emit(Diagnostic::ListenerFailed {
                        event: event.to_string(),
                        owner: entry.owner().to_string(),
                        error,
                    });
                }
            }
        }

        let pruned = self.registry.remove_entries(event, &closed);
        delivery.listeners_pruned = pruned.len();
        for entry in &pruned {
            self.diagnostics.emit(Diagnostic::ListenerPruned {
                event: event.to_string(),
                owner: entry.owner().to_string(),
            });
        }

        if !excluded {
            delivery.forward = self.bridge.forward(event, &payload);
        }

        delivery.payload = payload;
        Ok(delivery)
    }

    fn open_gate(
        &self,
        gate: &DecryptGate,
        event: &str,
        payload: Value,
        delivery: &mut Delivery,
    ) -> Result<Value> {
        let decrypted = match decode_body(&payload, &gate.field) {
            BodyDecode::NotApplicable => None,
            BodyDecode::BodyRejected { unexpected_keys } => {
                self.diagnostics.emit(Diagnostic::BodyRejected {
                    event: event.to_string(),
                    unexpected_keys,
                });
                delivery.body_rejected = true;
                None
            }
            BodyDecode::Encrypted(field) => {
                let items = field
                    .as_array()
                    .ok_or_else(|| DecryptError::MalformedContainer(kind_of(field).to_string()))?;
                Some(gate.decryptor.decrypt(gate.secret.expose(), items)?)
            }
        };

        delivery.decrypted = decrypted.is_some();
        Ok(decrypted.unwrap_or(payload))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Assembles an [`EventRouter`] from config and collaborators.
#[derive(Default)]
pub struct RouterBuilder {
    config: RelayConfig,
    store: Option<Arc<dyn ActionStore>>,
    decryptor: Option<Arc<dyn Decryptor>>,
    diagnostics: Option<Arc<dyn Diagnostics>>,
}

impl RouterBuilder {
    pub fn config(mut self, config: RelayConfig) -> Self {
        self.config = config;
        self
    }

    /// Forward events into `store`.
    pub fn store(mut self, store: Arc<dyn ActionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the bundled [`PassphraseAes`] decryptor.
    pub fn decryptor(mut self, decryptor: Arc<dyn Decryptor>) -> Self {
        self.decryptor = Some(decryptor);
        self
    }

    pub fn diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn build(self) -> Result<EventRouter> {
        let config = self.config.validated()?;
        let diagnostics = self
            .diagnostics
            .unwrap_or_else(|| Arc::new(TracingDiagnostics));

        let gate = config.decryption().map(|(secret, field)| DecryptGate {
            secret: secret.clone(),
            field: field.to_string(),
            decryptor: self
                .decryptor
                .clone()
                .unwrap_or_else(|| Arc::new(PassphraseAes::new())),
        });

        let binding = self.store.map(|store| StoreBinding {
            store,
            action_prefix: config.action_prefix.clone(),
            mutation_prefix: config.mutation_prefix.clone(),
        });
        let bridge = StoreBridge::new(binding, Arc::clone(&diagnostics));

        diagnostics.emit(Diagnostic::AdapterStatus {
            store: bridge.is_bound(),
            actions: bridge.is_bound(),
            mutations: bridge.mutations_enabled(),
        });

        Ok(EventRouter {
            registry: SubscriptionRegistry::with_diagnostics(Arc::clone(&diagnostics)),
            gate,
            bridge,
            diagnostics,
        })
    }
}
