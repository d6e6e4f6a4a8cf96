//! One-shot setup announcement.
//!
//! Once the network link and the bus broker are both connected, a node
//! publishes its self-descriptor to the setup topic exactly once. The
//! `sent` gate is in-memory only: a reboot announces again, which the
//! master node treats as idempotent.

use tracing::info;

use unishare_types::{NodeIdentity, SetupPayload};

use crate::error::Result;
use crate::link::BusLink;
use crate::topic;

/// Gates the one-shot self-registration publish.
#[derive(Debug, Default)]
pub struct SetupAnnouncer {
    sent: bool,
}

impl SetupAnnouncer {
    /// Create an announcer that has not yet fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the announcement has been published.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// Publish the self-descriptor if it has not been sent yet.
    ///
    /// A successful publish sets the gate; a failed publish leaves it
    /// unset so the next cycle retries.
    pub async fn announce<B: BusLink>(
        &mut self,
        bus: &mut B,
        identity: &NodeIdentity,
    ) -> Result<()> {
        if self.sent {
            return Ok(());
        }
        let payload = SetupPayload::for_node(identity).encode()?;
        bus.publish(topic::SETUP, payload, false).await?;
        self.sent = true;
        info!(id = %identity.id, kind = %identity.kind, "setup descriptor announced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use unishare_types::DeviceId;

    use super::*;
    use crate::mock::MockBus;

    fn identity() -> NodeIdentity {
        NodeIdentity::new(DeviceId::new("AA11BB22").unwrap(), "screen", "screen1")
    }

    #[tokio::test]
    async fn announces_exactly_once() {
        let mut bus = MockBus::new();
        bus.connect().await.unwrap();
        let mut announcer = SetupAnnouncer::new();

        announcer.announce(&mut bus, &identity()).await.unwrap();
        announcer.announce(&mut bus, &identity()).await.unwrap();

        let setups: Vec<_> = bus
            .published
            .iter()
            .filter(|p| p.topic == topic::SETUP)
            .collect();
        assert_eq!(setups.len(), 1);
        assert!(!setups[0].retain);
        assert!(announcer.is_sent());
    }

    #[tokio::test]
    async fn failed_publish_leaves_gate_unset() {
        let mut bus = MockBus::new();
        bus.connect().await.unwrap();
        bus.fail_next_publish();
        let mut announcer = SetupAnnouncer::new();

        assert!(announcer.announce(&mut bus, &identity()).await.is_err());
        assert!(!announcer.is_sent());

        // Next cycle succeeds and sets the gate.
        announcer.announce(&mut bus, &identity()).await.unwrap();
        assert!(announcer.is_sent());
    }
}
