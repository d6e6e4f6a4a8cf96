//! Error types for unishare-core.
//!
//! None of these errors is fatal to a node. The recovery contract per
//! variant:
//!
//! | Error | Recovery |
//! |-------|----------|
//! | [`Error::ConnectionTimeout`] | retried on a later cycle, UI keeps last-known data |
//! | [`Error::Decode`] | message dropped, no state change, logged |
//! | [`Error::RegistryFull`] | overflow entries dropped, logged |
//! | [`Error::UnknownDevice`] | dropped silently, expected transient ordering |
//! | [`Error::Bus`] | transport marked disconnected, supervisor reconnects |

use std::time::Duration;

use thiserror::Error;

use unishare_types::{DeviceId, ParseError};

/// Errors that can occur while routing bus traffic and supervising links.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A connection attempt exceeded its elapsed-time budget.
    #[error("{link} connection attempts exceeded {budget:?} budget")]
    ConnectionTimeout {
        /// Which link timed out (`"network"` or `"broker"`).
        link: &'static str,
        /// The budget that was exhausted.
        budget: Duration,
    },

    /// A payload or identifier failed to decode; the message is dropped.
    #[error(transparent)]
    Decode(#[from] ParseError),

    /// The registry is at capacity; the overflow entry is dropped.
    #[error("device registry full: capacity {capacity} reached")]
    RegistryFull {
        /// The fixed capacity that was reached.
        capacity: usize,
    },

    /// Telemetry or status arrived for an identifier never seen in a roster.
    #[error("message for unknown device {id}")]
    UnknownDevice {
        /// The unrostered identifier.
        id: DeviceId,
    },

    /// The bus transport reported a failure.
    #[error("bus transport error: {0}")]
    Bus(String),
}

impl Error {
    /// Whether this error is expected to clear on a later cycle without
    /// intervention. Transient errors are logged at `warn` by callers,
    /// the rest at `debug`.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::ConnectionTimeout { .. } | Error::Bus(_) | Error::UnknownDevice { .. }
        )
    }
}

/// Result type alias using unishare-core's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
