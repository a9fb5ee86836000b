//! Relay configuration.

use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action prefix used when none (or an empty one) is configured.
pub const DEFAULT_ACTION_PREFIX: &str = "SOCKET_";

/// Construction-time settings for an [`EventRouter`](crate::EventRouter).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Prefix prepended to an event name to find store actions.
    /// Default: "SOCKET_"
    pub action_prefix: String,

    /// Prefix for store mutations (None = mutation forwarding disabled).
    pub mutation_prefix: Option<String>,

    /// Shared secret for the decrypt gate (None = never decrypt).
    pub secret: Option<Secret>,

    /// Name of the only key an encrypted payload may carry.
    /// Required when `secret` is set.
    pub encrypted_field: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            action_prefix: DEFAULT_ACTION_PREFIX.to_string(),
            mutation_prefix: None,
            secret: None,
            encrypted_field: None,
        }
    }
}

impl RelayConfig {
    /// Read a config from JSON, then normalize and validate it.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)
            .map_err(|e| RelayError::InvalidConfig(e.to_string()))?;
        config.validated()
    }

    /// Enable the decrypt gate.
    pub fn with_decryption(mut self, secret: impl Into<String>, field: impl Into<String>) -> Self {
        self.secret = Some(Secret::new(secret));
        self.encrypted_field = Some(field.into());
        self
    }

    /// Enable mutation forwarding.
    pub fn with_mutation_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.mutation_prefix = Some(prefix.into());
        self
    }

    pub fn with_action_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.action_prefix = prefix.into();
        self
    }

    /// Apply fallbacks and check that the decrypt settings are complete.
    ///
    /// An empty action prefix falls back to the default; an empty mutation
    /// prefix disables mutation forwarding.
    pub fn validated(mut self) -> Result<Self> {
        if self.action_prefix.is_empty() {
            self.action_prefix = DEFAULT_ACTION_PREFIX.to_string();
        }
        if self.mutation_prefix.as_deref() == Some("") {
            self.mutation_prefix = None;
        }
        if self.encrypted_field.as_deref() == Some("") {
            self.encrypted_field = None;
        }

        if self.secret.is_some() && self.encrypted_field.is_none() {
            return Err(RelayError::InvalidConfig(
                "encrypted_field is required when a secret is set".to_string(),
            ));
        }

        Ok(self)
    }

    /// The decrypt settings, if the gate is enabled.
    pub fn decryption(&self) -> Option<(&Secret, &str)> {
        match (&self.secret, &self.encrypted_field) {
            (Some(secret), Some(field)) => Some((secret, field.as_str())),
            _ => None,
        }
    }
}

/// A shared secret that stays out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(secret: impl Into<String>) -> Self {
        Secret(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::from_json(json!({})).unwrap();
        assert_eq!(config.action_prefix, "SOCKET_");
        assert!(config.mutation_prefix.is_none());
        assert!(config.decryption().is_none());
    }

    #[test]
    fn test_empty_prefixes_fall_back() {
        let config = RelayConfig::from_json(json!({
            "action_prefix": "",
            "mutation_prefix": "",
        }))
        .unwrap();
        assert_eq!(config.action_prefix, "SOCKET_");
        assert!(config.mutation_prefix.is_none());
    }

    #[test]
    fn test_secret_requires_field() {
        let err = RelayConfig::from_json(json!({ "secret": "k" })).unwrap_err();
        assert!(matches!(err, RelayError::InvalidConfig(_)));
        assert_eq!(err.code(), "ERR_INVALID_CONFIG");

        let config = RelayConfig::from_json(json!({
            "secret": "k",
            "encrypted_field": "msg",
        }))
        .unwrap();
        let (secret, field) = config.decryption().unwrap();
        assert_eq!(secret.expose(), "k");
        assert_eq!(field, "msg");
    }

    #[test]
    fn test_unknown_shape_is_invalid_config() {
        let err = RelayConfig::from_json(json!({ "action_prefix": 7 })).unwrap_err();
        assert!(matches!(err, RelayError::InvalidConfig(_)));
    }

    #[test]
    fn test_secret_is_redacted() {
        let config = RelayConfig::default().with_decryption("hunter2", "msg");
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
