//! Listener entries and channel subscription handles.

use crate::error::ListenerError;
use crate::types::SubscriberId;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

/// What a listener callback returns.
pub type ListenerResult = std::result::Result<(), ListenerError>;

/// A shareable listener callback.
pub type Callback = Arc<dyn Fn(&Value) -> ListenerResult + Send + Sync>;

/// Wrap a closure as a [`Callback`].
pub fn callback<F>(f: F) -> Callback
where
    F: Fn(&Value) -> ListenerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Error a listener returns once its consumer is gone for good.
///
/// The router removes such a listener after the current fan-out instead of
/// reporting it as a failure.
#[derive(Clone, Copy, Debug, Default, Error)]
#[error("listener closed")]
pub struct ListenerClosed;

/// Why [`ListenerEntry::invoke`] did not succeed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListenerFailure {
    /// The listener returned [`ListenerClosed`].
    Closed,
    /// The listener returned an error or panicked.
    Failed(String),
}

/// One registered (callback, owner) pair.
#[derive(Clone)]
pub struct ListenerEntry {
    callback: Callback,
    owner: SubscriberId,
}

impl ListenerEntry {
    pub(crate) fn new(callback: Callback, owner: SubscriberId) -> Self {
        Self { callback, owner }
    }

    pub fn owner(&self) -> &SubscriberId {
        &self.owner
    }

    /// Whether two entries hold the very same callback.
    pub fn same_callback(&self, callback: &Callback) -> bool {
        Arc::ptr_eq(&self.callback, callback)
    }

    /// Whether both entries were created from the same callback.
    pub fn same_entry(&self, other: &ListenerEntry) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }

    /// Run the callback, turning a panic into an error message.
    pub fn invoke(&self, payload: &Value) -> Result<(), ListenerFailure> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(payload))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) if e.is::<ListenerClosed>() => Err(ListenerFailure::Closed),
            Ok(Err(e)) => Err(ListenerFailure::Failed(e.to_string())),
            Err(panic) => Err(ListenerFailure::Failed(panic_message(panic.as_ref()))),
        }
    }
}

impl fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

/// Receiving end of a channel-backed subscription.
///
/// Dropping the handle closes the listener; the router removes it on the
/// next delivery to its event.
pub struct ChannelSubscription {
    pub owner: SubscriberId,
    pub event: String,
    /// Payloads delivered to this subscriber.
    pub receiver: crossbeam_channel::Receiver<Value>,
}

impl ChannelSubscription {
    /// Receive the next payload (blocking).
    pub fn recv(&self) -> Result<Value, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a payload (non-blocking).
    pub fn try_recv(&self) -> Result<Value, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<Value, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
