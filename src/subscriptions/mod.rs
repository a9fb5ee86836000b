//! Listener registry for inbound socket events.
//!
//! Listeners are keyed by event name and owned by a [`SubscriberId`]:
//! - Fan-out order is registration order
//! - Removing one owner never reorders or drops another owner's listeners
//! - Reads hand out snapshots, so a listener may subscribe or unsubscribe
//!   while a fan-out is in flight
//! - A listener that returns [`ListenerClosed`] is dropped after the fan-out
//!   that saw it
//!
//! # Example
//!
//! ```ignore
//! let registry = SubscriptionRegistry::new();
//! let chat = SubscriberId::new("ChatWindow");
//!
//! registry.subscribe("message", |payload| {
//!     println!("got {payload}");
//!     Ok(())
//! }, &chat);
//!
//! // Or receive through a bounded channel
//! let sub = registry.subscribe_channel("typing", &chat, 64);
//!
//! registry.unsubscribe_all(&chat);
//! ```
//!
//! [`SubscriberId`]: crate::types::SubscriberId

mod registry;
mod types;

pub use registry::SubscriptionRegistry;
pub use types::{
    callback, Callback, ChannelSubscription, ListenerClosed, ListenerEntry, ListenerFailure,
    ListenerResult,
};
