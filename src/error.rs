//! Error types for the relay.

use thiserror::Error;

/// Main error type for relay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Callback for #{event} must be a function")]
    InvalidCallback { event: String },

    #[error("Couldn't decrypt. Wrong secret used on client or invalid data sent. ({0})")]
    Decryption(#[from] DecryptError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RelayError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::InvalidCallback { .. } => "ERR_INVALID_CALLBACK",
            RelayError::Decryption(_) => "ERR_DECRYPTION_ERROR",
            RelayError::InvalidConfig(_) => "ERR_INVALID_CONFIG",
        }
    }
}

/// Why a ciphertext could not be turned back into a payload.
#[derive(Debug, Error)]
pub enum DecryptError {
    #[error("expected a non-empty array of ciphertext strings, got {0}")]
    MalformedContainer(String),

    #[error("invalid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("missing salt header")]
    MissingSalt,

    #[error("ciphertext length {0} is not a multiple of the block size")]
    Truncated(usize),

    #[error("bad padding (wrong secret?)")]
    BadPadding,

    #[error("plaintext is not UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("plaintext is not JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Error a listener callback may return; caught and logged by the router.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
