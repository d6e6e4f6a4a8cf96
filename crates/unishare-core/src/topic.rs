//! Topic families of the unishare bus.
//!
//! Three inbound families are routed (case-sensitive, `/`-delimited):
//!
//! - [`ROSTER`]: the full list of known sensor identifiers;
//! - `unishare/sensors/<id>/<field>`: one field's value for one device;
//! - `unishare/devices/status/<id>`: one device's liveness flag.
//!
//! Identifier extraction uses a last-separator split: for telemetry the
//! identifier is the segment between the last two separators and the field
//! name is the final segment; for status the identifier is the final
//! segment. A topic matching none of the families is ignored, not an error.

use std::str::FromStr;

use unishare_types::{DeviceId, TelemetryField, TelemetryValue, payload};

use crate::error::Result;

/// Roster topic: payload is the full sensor list.
pub const ROSTER: &str = "unishare/devices/all_sensors";

/// Outbound setup topic for node self-registration.
pub const SETUP: &str = "unishare/devices/setup";

/// Prefix of per-device telemetry topics.
pub const SENSORS_PREFIX: &str = "unishare/sensors/";

/// Prefix of per-device status topics.
pub const STATUS_PREFIX: &str = "unishare/devices/status/";

/// Subscription filter covering every telemetry topic.
pub const TELEMETRY_FILTER: &str = "unishare/sensors/#";

/// Subscription filter covering every status topic.
pub const STATUS_FILTER: &str = "unishare/devices/status/#";

/// A decoded inbound bus message.
#[derive(Debug, Clone, PartialEq)]
pub enum BusMessage {
    /// The full roster of known sensor identifiers, in message order.
    /// Duplicates within one message are possible and tolerated.
    Roster(Vec<DeviceId>),
    /// One field's value for one device.
    Telemetry {
        /// The addressed device.
        id: DeviceId,
        /// Which field the value belongs to.
        field: TelemetryField,
        /// The decoded, type-checked value.
        value: TelemetryValue,
    },
    /// One device's liveness flag.
    Status {
        /// The addressed device.
        id: DeviceId,
        /// Last known liveness.
        connected: bool,
    },
}

/// Classify a topic and decode its payload.
///
/// Returns `Ok(None)` for topics outside the three families (ignored, not
/// an error). A matching topic with a malformed payload, an invalid
/// embedded identifier, or an unknown field name yields a decode error;
/// the caller drops the message and mutates nothing.
pub fn classify(topic: &str, payload: &[u8]) -> Result<Option<BusMessage>> {
    if topic == ROSTER {
        return Ok(Some(BusMessage::Roster(payload::decode_roster(payload)?)));
    }

    if let Some(rest) = topic.strip_prefix(SENSORS_PREFIX) {
        let mut segments = rest.rsplit('/');
        let field = segments.next().unwrap_or_default();
        let Some(id) = segments.next() else {
            // No field segment at all; outside the family shape.
            return Ok(None);
        };
        let field = TelemetryField::from_str(field)?;
        let id = DeviceId::new(id)?;
        let value = payload::decode_value(field, payload)?;
        return Ok(Some(BusMessage::Telemetry { id, field, value }));
    }

    if let Some(rest) = topic.strip_prefix(STATUS_PREFIX) {
        let id = rest.rsplit('/').next().unwrap_or(rest);
        let id = DeviceId::new(id)?;
        let connected = payload::decode_status(payload)?;
        return Ok(Some(BusMessage::Status { id, connected }));
    }

    Ok(None)
}

/// Build the telemetry topic for one device and field.
#[must_use]
pub fn telemetry_topic(id: &DeviceId, field: TelemetryField) -> String {
    format!("{SENSORS_PREFIX}{id}/{field}")
}

/// Build the status topic for one device.
#[must_use]
pub fn status_topic(id: &DeviceId) -> String {
    format!("{STATUS_PREFIX}{id}")
}
