//! Applies decoded bus messages to the device registry.
//!
//! Ingest has no side effects beyond registry mutation: rendering is driven
//! separately by the UI controller so bursty traffic cannot cause redundant
//! redraws. A device must appear in a roster message before its telemetry
//! or status is accepted; earlier messages are dropped silently, an
//! expected transient of retained-message replay ordering.

use tracing::{debug, warn};

use unishare_types::{DeviceId, TelemetryField};

use crate::error::Error;
use crate::registry::DeviceRegistry;
use crate::topic::BusMessage;

/// What an ingested message changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// A roster message was synced.
    Roster {
        /// Newly inserted identifiers.
        added: usize,
        /// Identifiers dropped because the registry was full.
        dropped: usize,
    },
    /// One field of one device was updated.
    Field {
        /// Slot index of the updated device.
        index: usize,
        /// The updated field.
        field: TelemetryField,
    },
    /// One device's liveness flag was updated.
    Status {
        /// Slot index of the updated device.
        index: usize,
        /// The new liveness value.
        connected: bool,
    },
    /// The message addressed an unknown device or mismatched its slot;
    /// nothing changed.
    Ignored,
}

impl Applied {
    /// Whether the registry was mutated.
    #[must_use]
    pub fn changed(&self) -> bool {
        !matches!(self, Applied::Ignored)
    }
}

/// Apply one decoded message to the registry.
///
/// Never fails: overflow and unknown-device conditions are logged and
/// reported through [`Applied`], keeping the node alive on any traffic.
pub fn apply(registry: &mut DeviceRegistry, message: BusMessage) -> Applied {
    match message {
        BusMessage::Roster(ids) => sync_roster(registry, ids),
        BusMessage::Telemetry { id, field, value } => match registry.find(&id) {
            Some(index) => {
                if registry.set_field(index, field, value) {
                    Applied::Field { index, field }
                } else {
                    Applied::Ignored
                }
            }
            None => drop_unknown(&id),
        },
        BusMessage::Status { id, connected } => match registry.find(&id) {
            Some(index) => {
                registry.set_status(index, connected);
                Applied::Status { index, connected }
            }
            None => drop_unknown(&id),
        },
    }
}

fn sync_roster(registry: &mut DeviceRegistry, ids: Vec<DeviceId>) -> Applied {
    let roster_len = ids.len();
    let before = registry.len();
    let mut dropped = 0usize;

    for id in ids {
        match registry.insert_if_absent(id) {
            Ok(_) => {}
            Err(Error::RegistryFull { .. }) => dropped += 1,
            // insert_if_absent only fails with RegistryFull
            Err(err) => {
                warn!(error = %err, "unexpected registry error during roster sync");
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        warn!(
            dropped,
            capacity = registry.capacity(),
            "roster exceeds registry capacity; overflow entries dropped"
        );
    }

    registry.set_roster_len(roster_len);
    Applied::Roster {
        added: registry.len() - before,
        dropped,
    }
}

fn drop_unknown(id: &DeviceId) -> Applied {
    // Expected ordering transient: the device has not been rostered yet.
    debug!(%id, "dropped message for unrostered device");
    Applied::Ignored
}
