//! Fixed-capacity table of known remote devices.
//!
//! The registry is the only cross-component mutable state in a node. It is
//! populated incrementally by roster messages (append-only: stale devices
//! are never evicted), updated in place by telemetry and status messages,
//! and never persisted.

use tracing::warn;

use unishare_types::{DeviceId, SensorState, TelemetryField, TelemetryValue};

use crate::error::{Error, Result};

/// Capacity of the reference configuration.
pub const DEFAULT_CAPACITY: usize = 10;

/// Bounded, append-only table of [`SensorState`] records keyed by identifier.
///
/// Invariants: no duplicate identifiers among valid entries; a slot's
/// identifier never changes once assigned; `len() <= capacity()`.
///
/// The registry additionally tracks a *paging bound*: the number of devices
/// the UI pages across, reassigned from the size of the latest roster
/// message (clamped to capacity). The bound may disagree with `len()` when
/// a roster shrinks or repeats identifiers; callers must treat an index
/// with no record as "no data" rather than an invariant violation.
#[derive(Debug)]
pub struct DeviceRegistry {
    slots: Vec<SensorState>,
    capacity: usize,
    paging_len: usize,
}

impl DeviceRegistry {
    /// Create an empty registry with the given fixed capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            paging_len: 0,
        }
    }

    /// The fixed capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of valid entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the registry holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Linear scan for an identifier among valid entries.
    #[must_use]
    pub fn find(&self, id: &DeviceId) -> Option<usize> {
        self.slots.iter().position(|slot| &slot.id == id)
    }

    /// Return the slot index for an identifier, appending a zero-valued
    /// record if it is absent.
    ///
    /// Idempotent: an already-present identifier returns its existing index
    /// and mutates nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistryFull`] when the identifier is absent and
    /// every slot is taken; the caller drops the entry (there is no
    /// eviction policy).
    pub fn insert_if_absent(&mut self, id: DeviceId) -> Result<usize> {
        if let Some(index) = self.find(&id) {
            return Ok(index);
        }
        if self.slots.len() >= self.capacity {
            return Err(Error::RegistryFull {
                capacity: self.capacity,
            });
        }
        self.slots.push(SensorState::new(id));
        Ok(self.slots.len() - 1)
    }

    /// The record at `index`, if valid.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SensorState> {
        self.slots.get(index)
    }

    /// Apply one telemetry field update to the record at `index`.
    ///
    /// Returns `false` (and logs) when the index is invalid or the value's
    /// type does not match the field; the update is dropped.
    pub fn set_field(&mut self, index: usize, field: TelemetryField, value: TelemetryValue) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                let applied = slot.apply(field, value);
                if !applied {
                    warn!(%field, ?value, "dropped type-mismatched field update");
                }
                applied
            }
            None => false,
        }
    }

    /// Set the liveness flag of the record at `index`.
    pub fn set_status(&mut self, index: usize, connected: bool) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.connected = connected;
                true
            }
            None => false,
        }
    }

    /// Iterate the valid entries in slot order.
    ///
    /// The iterator is finite and restartable; it reflects live state at
    /// each access, there is no snapshot.
    pub fn iter(&self) -> impl Iterator<Item = &SensorState> {
        self.slots.iter()
    }

    /// Number of devices the UI pages across.
    #[must_use]
    pub fn paging_len(&self) -> usize {
        self.paging_len
    }

    /// Reassign the paging bound from the size of the latest roster
    /// message, clamped to capacity.
    pub fn set_roster_len(&mut self, roster_len: usize) {
        self.paging_len = roster_len.min(self.capacity);
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> DeviceId {
        DeviceId::new(raw).unwrap()
    }

    #[test]
    fn insert_if_absent_is_idempotent() {
        let mut registry = DeviceRegistry::default();
        let first = registry.insert_if_absent(id("AA11BB22")).unwrap();
        let second = registry.insert_if_absent(id("AA11BB22")).unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn new_entries_are_zero_valued() {
        let mut registry = DeviceRegistry::default();
        let index = registry.insert_if_absent(id("AA11BB22")).unwrap();
        let record = registry.get(index).unwrap();
        assert_eq!(record.id.as_str(), "AA11BB22");
        assert_eq!(record.humidity, 0.0);
        assert!(!record.flame);
        assert!(!record.connected);
    }

    #[test]
    fn capacity_is_enforced_without_eviction() {
        let mut registry = DeviceRegistry::new(2);
        registry.insert_if_absent(id("A1")).unwrap();
        registry.insert_if_absent(id("B2")).unwrap();
        assert!(matches!(
            registry.insert_if_absent(id("C3")),
            Err(Error::RegistryFull { capacity: 2 })
        ));
        // Existing entries are still reachable and idempotent at capacity.
        assert_eq!(registry.insert_if_absent(id("A1")).unwrap(), 0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn identifiers_are_immutable_once_assigned() {
        let mut registry = DeviceRegistry::default();
        let index = registry.insert_if_absent(id("AA11BB22")).unwrap();
        registry.set_field(index, TelemetryField::Temperature, TelemetryValue::Float(21.0));
        registry.set_status(index, true);
        assert_eq!(registry.get(index).unwrap().id.as_str(), "AA11BB22");
    }

    #[test]
    fn set_field_drops_invalid_index_and_mismatch() {
        let mut registry = DeviceRegistry::default();
        assert!(!registry.set_field(0, TelemetryField::Light, TelemetryValue::Bool(true)));
        let index = registry.insert_if_absent(id("AA11BB22")).unwrap();
        assert!(!registry.set_field(index, TelemetryField::Light, TelemetryValue::Float(1.0)));
        assert!(!registry.get(index).unwrap().light);
    }

    #[test]
    fn paging_bound_is_clamped_to_capacity() {
        let mut registry = DeviceRegistry::new(3);
        registry.set_roster_len(7);
        assert_eq!(registry.paging_len(), 3);
        registry.set_roster_len(1);
        assert_eq!(registry.paging_len(), 1);
        registry.set_roster_len(0);
        assert_eq!(registry.paging_len(), 0);
    }

    #[test]
    fn iteration_is_restartable_and_in_slot_order() {
        let mut registry = DeviceRegistry::default();
        registry.insert_if_absent(id("A1")).unwrap();
        registry.insert_if_absent(id("B2")).unwrap();
        let ids: Vec<&str> = registry.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["A1", "B2"]);
        let again: Vec<&str> = registry.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(again, ids);
    }
}
