//! Platform-agnostic types for the unishare sensor bus.
//!
//! This crate defines the data model shared by every unishare node:
//! canonical device identifiers, the telemetry field enumeration, the
//! per-device sensor state record, and the JSON payload schemas used on
//! the message bus. It performs no I/O and has no async dependencies;
//! topic routing and connection handling live in `unishare-core`.
//!
//! # Payload Schemas
//!
//! Three inbound payload shapes are decoded, one per topic family:
//!
//! | Family    | Payload                                      |
//! |-----------|----------------------------------------------|
//! | roster    | JSON array of objects with `MAC_ADDRESS`     |
//! | telemetry | JSON object `{"value": <number or bool>}`    |
//! | status    | JSON object `{"connected": <bool>}`          |
//!
//! Decoding is schema-validating: a malformed payload yields a
//! [`ParseError`] and never a silently defaulted value.

pub mod error;
pub mod payload;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use payload::{
    SetupPayload, StatusPayload, decode_roster, decode_status, decode_value, encode_roster,
    encode_value,
};
pub use types::{DeviceId, FieldKind, NodeIdentity, SensorState, TelemetryField, TelemetryValue};
