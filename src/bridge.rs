//! Forwarding of socket events into an external action/mutation store.
//!
//! The store is reached only through [`ActionStore`]: it lists the names it
//! has registered and runs one by name. Names may be namespaced with "/";
//! only the last segment (the leaf) is compared against `prefix + event`.

use crate::diagnostics::{Diagnostic, Diagnostics};
use serde_json::Value;
use std::sync::Arc;

/// Capability surface of an external state-mutation store.
pub trait ActionStore: Send + Sync {
    /// Registered action names, or None when the store has no action registry.
    fn action_names(&self) -> Option<Vec<String>>;

    /// Registered mutation names.
    fn mutation_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Run the action registered under `name`. Fire and forget.
    fn dispatch(&self, name: &str, payload: &Value);

    /// Commit the mutation registered under `name`. Stores without
    /// mutations can keep the default, which ignores the call.
    fn commit(&self, _name: &str, _payload: &Value) {}
}

/// A store plus the prefixes used to address it.
#[derive(Clone)]
pub struct StoreBinding {
    pub store: Arc<dyn ActionStore>,
    pub action_prefix: String,
    pub mutation_prefix: Option<String>,
}

/// What a forward invoked on the store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForwardSummary {
    /// Full names of dispatched actions, in store order.
    pub dispatched: Vec<String>,
    /// Full names of committed mutations, in store order.
    pub committed: Vec<String>,
}

impl ForwardSummary {
    pub fn is_empty(&self) -> bool {
        self.dispatched.is_empty() && self.committed.is_empty()
    }
}

/// Final "/"-separated segment of a namespaced name.
pub fn leaf_name(name: &str) -> &str {
    name.rsplit_once('/').map_or(name, |(_, leaf)| leaf)
}

/// Translates events into action dispatches and mutation commits.
pub struct StoreBridge {
    binding: Option<StoreBinding>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl StoreBridge {
    pub fn new(binding: Option<StoreBinding>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            binding,
            diagnostics,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn mutations_enabled(&self) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| b.mutation_prefix.is_some())
    }

    /// Dispatch every action and commit every mutation whose leaf name is
    /// exactly the prefixed event name.
    pub fn forward(&self, event: &str, payload: &Value) -> ForwardSummary {
        let mut summary = ForwardSummary::default();
        let Some(binding) = &self.binding else {
            return summary;
        };
        let Some(actions) = binding.store.action_names() else {
            return summary;
        };

        let action = format!("{}{}", binding.action_prefix, event);
        for name in actions.iter().filter(|name| leaf_name(name) == action) {
            self.diagnostics.emit(Diagnostic::ActionDispatched { name: name.clone() });
            binding.store.dispatch(name, payload);
            summary.dispatched.push(name.clone());
        }

        if let Some(prefix) = &binding.mutation_prefix {
            let mutation = format!("{prefix}{event}");
            for name in binding
                .store
                .mutation_names()
                .iter()
                .filter(|name| leaf_name(name) == mutation)
            {
                self.diagnostics.emit(Diagnostic::MutationCommitted { name: name.clone() });
                binding.store.commit(name, payload);
                summary.committed.push(name.clone());
            }
        }

        summary
    }
}
