//! Passphrase AES-256-CBC in the OpenSSL "Salted__" envelope.
//!
//! Layout of a ciphertext item, base64 encoded:
//!
//! ```text
//! "Salted__" | salt (8 bytes) | AES-256-CBC(PKCS#7(plaintext))
//! ```
//!
//! Key and IV come from EVP_BytesToKey with MD5, one iteration, which is what
//! passphrase-based JavaScript AES clients emit.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};
use serde_json::Value;

use super::Decryptor;
use crate::error::DecryptError;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

const SALT_HEADER: &[u8; 8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;

/// Default decrypt capability.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassphraseAes;

impl PassphraseAes {
    pub fn new() -> Self {
        Self
    }

    /// Encrypt `value` as JSON under `secret` with the given salt.
    pub fn seal(&self, secret: &str, value: &Value, salt: [u8; SALT_LEN]) -> String {
        seal(secret, value, salt)
    }

    /// Decrypt one base64 ciphertext item and parse it as JSON.
    pub fn open(&self, secret: &str, ciphertext: &str) -> Result<Value, DecryptError> {
        open(secret, ciphertext)
    }
}

impl Decryptor for PassphraseAes {
    fn decrypt(&self, secret: &str, ciphertexts: &[Value]) -> Result<Value, DecryptError> {
        let mut plaintexts = Vec::with_capacity(ciphertexts.len());
        for item in ciphertexts {
            let text = item
                .as_str()
                .ok_or_else(|| DecryptError::MalformedContainer(format!("an item {item}")))?;
            plaintexts.push(open(secret, text)?);
        }

        plaintexts
            .into_iter()
            .next()
            .ok_or_else(|| DecryptError::MalformedContainer("an empty array".to_string()))
    }
}

/// EVP_BytesToKey(MD5, count = 1) for a 256-bit key and 128-bit IV.
fn derive_key_iv(secret: &[u8], salt: &[u8]) -> ([u8; KEY_LEN], [u8; IV_LEN]) {
    let mut derived = Vec::with_capacity(KEY_LEN + IV_LEN + 16);
    let mut block: Vec<u8> = Vec::new();

    while derived.len() < KEY_LEN + IV_LEN {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(secret);
        hasher.update(salt);
        block = hasher.finalize().to_vec();
        derived.extend_from_slice(&block);
    }

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    key.copy_from_slice(&derived[..KEY_LEN]);
    iv.copy_from_slice(&derived[KEY_LEN..KEY_LEN + IV_LEN]);
    (key, iv)
}

pub fn seal(secret: &str, value: &Value, salt: [u8; SALT_LEN]) -> String {
    let (key, iv) = derive_key_iv(secret.as_bytes(), &salt);
    let ciphertext = Aes256CbcEnc::new(&key.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(value.to_string().as_bytes());

    let mut raw = Vec::with_capacity(SALT_HEADER.len() + SALT_LEN + ciphertext.len());
    raw.extend_from_slice(SALT_HEADER);
    raw.extend_from_slice(&salt);
    raw.extend_from_slice(&ciphertext);
    STANDARD.encode(raw)
}

pub fn open(secret: &str, ciphertext: &str) -> Result<Value, DecryptError> {
    let raw = STANDARD.decode(ciphertext.trim())?;
    let body = raw
        .strip_prefix(SALT_HEADER.as_slice())
        .filter(|body| body.len() >= SALT_LEN)
        .ok_or(DecryptError::MissingSalt)?;
    let (salt, data) = body.split_at(SALT_LEN);

    if data.is_empty() || data.len() % BLOCK_LEN != 0 {
        return Err(DecryptError::Truncated(data.len()));
    }

    let (key, iv) = derive_key_iv(secret.as_bytes(), salt);
    let plaintext = Aes256CbcDec::new(&key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(|_| DecryptError::BadPadding)?;

    let text = String::from_utf8(plaintext)?;
    Ok(serde_json::from_str(&text)?)
}
