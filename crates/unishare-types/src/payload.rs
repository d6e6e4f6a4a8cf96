//! JSON payload schemas for the bus topic families.
//!
//! Each inbound family has a dedicated, schema-validating decode function
//! returning a typed result or a [`ParseError`]; a malformed payload is
//! dropped by the caller with no state change. Encoders exist for the
//! payloads this node publishes (status, setup) and for telemetry values
//! so tests can exercise the full encode/decode round trip.

use serde::{Deserialize, Serialize};

use crate::error::ParseResult;
use crate::types::{DeviceId, FieldKind, NodeIdentity, TelemetryField, TelemetryValue};

/// One entry of the roster payload.
#[derive(Debug, Serialize, Deserialize)]
struct RosterEntry {
    #[serde(rename = "MAC_ADDRESS")]
    mac_address: String,
}

/// Decode a roster payload: a JSON array of objects carrying `MAC_ADDRESS`.
///
/// Duplicate identifiers within one message are preserved; the caller's
/// insert-if-absent semantics make them harmless.
///
/// # Errors
///
/// Fails if the payload is not a JSON array of the expected shape or if any
/// entry's address does not canonicalize.
pub fn decode_roster(payload: &[u8]) -> ParseResult<Vec<DeviceId>> {
    let entries: Vec<RosterEntry> = serde_json::from_slice(payload)?;
    entries
        .iter()
        .map(|entry| DeviceId::new(&entry.mac_address))
        .collect()
}

/// Encode a roster payload from identifiers. Used by tests and tooling.
pub fn encode_roster(ids: &[DeviceId]) -> ParseResult<Vec<u8>> {
    let entries: Vec<RosterEntry> = ids
        .iter()
        .map(|id| RosterEntry {
            mac_address: id.as_str().to_string(),
        })
        .collect();
    Ok(serde_json::to_vec(&entries)?)
}

#[derive(Debug, Serialize, Deserialize)]
struct ValuePayload<T> {
    value: T,
}

/// Decode a telemetry value payload `{"value": ...}` according to the
/// field's expected type.
///
/// # Errors
///
/// Fails if the payload is malformed or the value's JSON type does not
/// match the field (a float for `light` is an error, never a default).
pub fn decode_value(field: TelemetryField, payload: &[u8]) -> ParseResult<TelemetryValue> {
    Ok(match field.kind() {
        FieldKind::Float => {
            TelemetryValue::Float(serde_json::from_slice::<ValuePayload<f64>>(payload)?.value)
        }
        FieldKind::Bool => {
            TelemetryValue::Bool(serde_json::from_slice::<ValuePayload<bool>>(payload)?.value)
        }
        FieldKind::Signal => {
            TelemetryValue::Signal(serde_json::from_slice::<ValuePayload<i64>>(payload)?.value)
        }
    })
}

/// Encode a telemetry value payload `{"value": ...}`.
pub fn encode_value(value: TelemetryValue) -> ParseResult<Vec<u8>> {
    Ok(match value {
        TelemetryValue::Float(v) => serde_json::to_vec(&ValuePayload { value: v })?,
        TelemetryValue::Bool(v) => serde_json::to_vec(&ValuePayload { value: v })?,
        TelemetryValue::Signal(v) => serde_json::to_vec(&ValuePayload { value: v })?,
    })
}

/// Liveness payload published on a device's own status topic and registered
/// as the broker-held will message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Whether the device considers itself connected.
    pub connected: bool,
}

impl StatusPayload {
    /// Payload announcing a live connection.
    #[must_use]
    pub fn online() -> Self {
        Self { connected: true }
    }

    /// Payload the broker publishes on unclean disconnect.
    #[must_use]
    pub fn offline() -> Self {
        Self { connected: false }
    }

    /// Encode to JSON bytes.
    pub fn encode(&self) -> ParseResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Decode a status payload `{"connected": <bool>}`.
pub fn decode_status(payload: &[u8]) -> ParseResult<bool> {
    let status: StatusPayload = serde_json::from_slice(payload)?;
    Ok(status.connected)
}

/// Self-descriptor published once to the setup topic when a node comes up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupPayload {
    /// Canonical hardware address of the announcing node.
    pub mac_address: String,
    /// Device type token.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable node name.
    pub name: String,
}

impl SetupPayload {
    /// Build the descriptor for a node identity.
    #[must_use]
    pub fn for_node(identity: &NodeIdentity) -> Self {
        Self {
            mac_address: identity.id.as_str().to_string(),
            kind: identity.kind.clone(),
            name: identity.name.clone(),
        }
    }

    /// Encode to JSON bytes.
    pub fn encode(&self) -> ParseResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
