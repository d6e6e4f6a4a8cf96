//! Core types for unishare sensor data.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Characters stripped from raw hardware addresses during canonicalization.
const SEPARATORS: [char; 3] = [':', '-', '.'];

/// Canonical identifier of a remote device.
///
/// Identifiers are hardware addresses with separator characters stripped;
/// the canonical form has no punctuation and is what appears in bus topics
/// and payloads. Once assigned to a registry slot, an identifier never
/// changes.
///
/// # Examples
///
/// ```
/// use unishare_types::DeviceId;
///
/// let id = DeviceId::new("AA:11:BB:22:CC:33").unwrap();
/// assert_eq!(id.as_str(), "AA11BB22CC33");
/// assert_eq!(id, DeviceId::new("AA11BB22CC33").unwrap());
/// assert!(DeviceId::new("::").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Canonicalize a raw hardware address into a `DeviceId`.
    ///
    /// Separator characters (`:`, `-`, `.`) are removed. The remainder must
    /// be non-empty and purely ASCII alphanumeric.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidIdentifier`] if nothing remains after
    /// stripping or if a non-alphanumeric character survives.
    pub fn new(raw: &str) -> Result<Self, ParseError> {
        let canonical: String = raw.chars().filter(|c| !SEPARATORS.contains(c)).collect();
        if canonical.is_empty() || !canonical.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ParseError::InvalidIdentifier(raw.to_string()));
        }
        Ok(Self(canonical))
    }

    /// The canonical identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Expected payload type of a telemetry field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Floating-point value (`humidity`, `temperature`, `apparent_temperature`).
    Float,
    /// Boolean value (`light`, `flame`).
    Bool,
    /// Signed integer, signal strength in dBm-like units (`rssi`).
    Signal,
}

/// One telemetry field of a remote device.
///
/// The `as_str`/`FromStr` pair matches the on-wire field names used in
/// telemetry topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelemetryField {
    /// Relative humidity percentage.
    Humidity,
    /// Temperature in degrees Celsius.
    Temperature,
    /// Heat-index temperature perceived by humans.
    ApparentTemperature,
    /// Ambient light above threshold.
    Light,
    /// Flame detected.
    Flame,
    /// Signal strength of the remote node's own link.
    Rssi,
}

impl TelemetryField {
    /// All fields, in wire-name order.
    pub const ALL: [TelemetryField; 6] = [
        TelemetryField::Humidity,
        TelemetryField::Temperature,
        TelemetryField::ApparentTemperature,
        TelemetryField::Light,
        TelemetryField::Flame,
        TelemetryField::Rssi,
    ];

    /// The on-wire name of this field.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetryField::Humidity => "humidity",
            TelemetryField::Temperature => "temperature",
            TelemetryField::ApparentTemperature => "apparent_temperature",
            TelemetryField::Light => "light",
            TelemetryField::Flame => "flame",
            TelemetryField::Rssi => "rssi",
        }
    }

    /// The payload type this field's values decode to.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            TelemetryField::Humidity
            | TelemetryField::Temperature
            | TelemetryField::ApparentTemperature => FieldKind::Float,
            TelemetryField::Light | TelemetryField::Flame => FieldKind::Bool,
            TelemetryField::Rssi => FieldKind::Signal,
        }
    }
}

impl FromStr for TelemetryField {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "humidity" => Ok(TelemetryField::Humidity),
            "temperature" => Ok(TelemetryField::Temperature),
            "apparent_temperature" => Ok(TelemetryField::ApparentTemperature),
            "light" => Ok(TelemetryField::Light),
            "flame" => Ok(TelemetryField::Flame),
            "rssi" => Ok(TelemetryField::Rssi),
            other => Err(ParseError::UnknownField(other.to_string())),
        }
    }
}

impl fmt::Display for TelemetryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded telemetry value, typed per [`FieldKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryValue {
    /// Value of a [`FieldKind::Float`] field.
    Float(f64),
    /// Value of a [`FieldKind::Bool`] field.
    Bool(bool),
    /// Value of a [`FieldKind::Signal`] field.
    Signal(i64),
}

/// Last known state of one remote device.
///
/// Fields default to zero/false until the first update for that field
/// arrives; there is no "unknown" marker, matching the bus contract where
/// every retained value is eventually replayed.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorState {
    /// Canonical identifier; immutable once the record is created.
    pub id: DeviceId,
    /// Relative humidity percentage.
    pub humidity: f64,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Heat-index temperature in degrees Celsius.
    pub apparent_temperature: f64,
    /// Ambient light above threshold.
    pub light: bool,
    /// Flame detected.
    pub flame: bool,
    /// Signal strength of the device's own link, dBm-like.
    pub rssi: i64,
    /// Last known liveness.
    pub connected: bool,
}

impl SensorState {
    /// Create a zero-valued record for a newly discovered device.
    #[must_use]
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            humidity: 0.0,
            temperature: 0.0,
            apparent_temperature: 0.0,
            light: false,
            flame: false,
            rssi: 0,
            connected: false,
        }
    }

    /// Apply one decoded field update.
    ///
    /// Returns `false` when the value's type does not match the field; the
    /// codec cannot produce such a pair, so callers treat it as a dropped
    /// message rather than a panic.
    pub fn apply(&mut self, field: TelemetryField, value: TelemetryValue) -> bool {
        match (field, value) {
            (TelemetryField::Humidity, TelemetryValue::Float(v)) => self.humidity = v,
            (TelemetryField::Temperature, TelemetryValue::Float(v)) => self.temperature = v,
            (TelemetryField::ApparentTemperature, TelemetryValue::Float(v)) => {
                self.apparent_temperature = v;
            }
            (TelemetryField::Light, TelemetryValue::Bool(v)) => self.light = v,
            (TelemetryField::Flame, TelemetryValue::Bool(v)) => self.flame = v,
            (TelemetryField::Rssi, TelemetryValue::Signal(v)) => self.rssi = v,
            _ => return false,
        }
        true
    }

    /// Read back one field as a typed value.
    #[must_use]
    pub fn value_of(&self, field: TelemetryField) -> TelemetryValue {
        match field {
            TelemetryField::Humidity => TelemetryValue::Float(self.humidity),
            TelemetryField::Temperature => TelemetryValue::Float(self.temperature),
            TelemetryField::ApparentTemperature => {
                TelemetryValue::Float(self.apparent_temperature)
            }
            TelemetryField::Light => TelemetryValue::Bool(self.light),
            TelemetryField::Flame => TelemetryValue::Bool(self.flame),
            TelemetryField::Rssi => TelemetryValue::Signal(self.rssi),
        }
    }
}

/// Identity a node presents to the bus: its own canonical address plus the
/// device type and human-readable name carried in the setup descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    /// This node's own canonical hardware address.
    pub id: DeviceId,
    /// Device type token, e.g. `"screen"` or `"sensors"`.
    pub kind: String,
    /// Human-readable node name.
    pub name: String,
}

impl NodeIdentity {
    /// Create a node identity.
    pub fn new(id: DeviceId, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            name: name.into(),
        }
    }
}
