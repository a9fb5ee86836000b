//! Pluggable decryption of inbound payloads.

mod passphrase;

pub use passphrase::PassphraseAes;

use crate::error::DecryptError;
use serde_json::Value;

/// Symmetric decrypt step used by the router's decrypt gate.
///
/// Takes the contents of the encrypted field (a sequence of ciphertext items,
/// normally exactly one) and returns the first decrypted value.
pub trait Decryptor: Send + Sync {
    fn decrypt(&self, secret: &str, ciphertexts: &[Value]) -> Result<Value, DecryptError>;
}
