//! JSON codec for the outer envelope and the per-type payloads.
//!
//! Pure functions only: nothing here touches the store or logs.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::domains::envelope::{Envelope, INTERNAL_ERROR_DATA, UNKNOWN_TYPE};
use crate::error::{RedChatError, Result};

pub const ENVELOPE_SHAPE: &str = "Envelope";

/// A request payload decodable from an envelope's `data`.
pub trait Payload: DeserializeOwned {
    const SHAPE: &'static str;
}

pub fn decode_envelope(bytes: &[u8]) -> Result<Envelope> {
    serde_json::from_slice(bytes).map_err(|e| RedChatError::decode(ENVELOPE_SHAPE, e.to_string()))
}

/// Best-effort recovery of the `type` code from bytes that failed to decode
/// as an envelope. Falls back to [`UNKNOWN_TYPE`].
pub fn recover_type(bytes: &[u8]) -> i64 {
    serde_json::from_slice::<Value>(bytes)
        .ok()
        .and_then(|value| value.get("type").and_then(Value::as_i64))
        .unwrap_or(UNKNOWN_TYPE)
}

pub fn decode_payload<T: Payload>(data: &Value) -> Result<T> {
    T::deserialize(data).map_err(|e| RedChatError::decode(T::SHAPE, e.to_string()))
}

pub fn to_data<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| RedChatError::Runtime(e.to_string()))
}

pub fn encode(envelope: &Envelope) -> Vec<u8> {
    serde_json::to_vec(envelope).unwrap_or_else(|_| {
        format!(
            "{{\"type\":{},\"data\":\"{}\"}}",
            envelope.kind, INTERNAL_ERROR_DATA
        )
        .into_bytes()
    })
}
