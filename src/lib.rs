//! # Socket Relay
//!
//! Fan-out of inbound socket events to in-process subscribers, with an
//! optional decrypt gate and optional forwarding into an external
//! action/mutation store.
//!
//! ## Core Concepts
//!
//! - **Registry**: listeners keyed by event name, owned by a subscriber
//! - **Router**: one `handle(event, payload)` call per inbound event
//! - **Decrypt gate**: `{ <field>: [ciphertext] }` bodies are decrypted
//!   before delivery; other shapes are delivered as they are
//! - **Store bridge**: `SOCKET_<event>` actions (and optionally prefixed
//!   mutations) are invoked by leaf name
//!
//! Transport lifecycle and heartbeat events (see [`EXCLUDED_EVENTS`]) skip
//! the decrypt gate and are never forwarded to the store.
//!
//! ## Example
//!
//! ```ignore
//! use socket_relay::{EventRouter, RelayConfig, SubscriberId};
//!
//! let router = EventRouter::builder()
//!     .config(RelayConfig::default().with_decryption("secret", "msg"))
//!     .store(store)
//!     .build()?;
//!
//! let chat = SubscriberId::new("ChatWindow");
//! router.subscribe("message", |payload| {
//!     println!("{payload}");
//!     Ok(())
//! }, &chat);
//!
//! // Called by the transport for every inbound event
//! router.handle("message", json!({ "msg": ["U2FsdGVkX1..."] }))?;
//! ```

pub mod bridge;
pub mod config;
pub mod crypto;
pub mod diagnostics;
pub mod error;
pub mod router;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use bridge::{leaf_name, ActionStore, ForwardSummary, StoreBinding, StoreBridge};
pub use config::{RelayConfig, Secret, DEFAULT_ACTION_PREFIX};
pub use crypto::{Decryptor, PassphraseAes};
pub use diagnostics::{Diagnostic, Diagnostics, RecordingDiagnostics, TracingDiagnostics};
pub use error::{DecryptError, ListenerError, RelayError, Result};
pub use router::{decode_body, BodyDecode, Delivery, EventRouter, RouterBuilder};
pub use subscriptions::{
    callback, Callback, ChannelSubscription, ListenerClosed, ListenerEntry, ListenerFailure,
    ListenerResult, SubscriptionRegistry,
};
pub use types::{is_excluded, SubscriberId, EXCLUDED_EVENTS};
