//! Shape check deciding what the decrypt gate does with a payload.
//!
//! Objects and arrays are keyed payloads: an array's keys are its indices
//! (`"0"`, `"1"`, ...). Scalars and `null` have no keys and skip the gate.

use serde_json::Value;

/// Outcome of inspecting a payload against the encrypted-field contract.
#[derive(Debug, PartialEq)]
pub enum BodyDecode<'a> {
    /// Only key is the encrypted field; holds that field's value.
    Encrypted(&'a Value),
    /// Keys other than the encrypted field, e.g. any non-empty array.
    BodyRejected { unexpected_keys: Vec<String> },
    /// Scalar, `null`, or a keyed payload with no keys. Nothing to decrypt.
    NotApplicable,
}

/// Whether the payload has keys the gate can inspect.
pub(crate) fn is_keyed(payload: &Value) -> bool {
    matches!(payload, Value::Object(_) | Value::Array(_))
}

pub fn decode_body<'a>(payload: &'a Value, encrypted_field: &str) -> BodyDecode<'a> {
    let keyed: Vec<(String, &Value)> = match payload {
        Value::Object(object) => object.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, v)| (index.to_string(), v))
            .collect(),
        _ => return BodyDecode::NotApplicable,
    };

    let unexpected_keys: Vec<String> = keyed
        .iter()
        .filter(|(key, _)| key != encrypted_field)
        .map(|(key, _)| key.clone())
        .collect();
    if !unexpected_keys.is_empty() {
        return BodyDecode::BodyRejected { unexpected_keys };
    }

    match keyed.first() {
        Some(&(_, field)) => BodyDecode::Encrypted(field),
        None => BodyDecode::NotApplicable,
    }
}
