//! Bounded-retry connection supervision.
//!
//! Each link follows the same state machine: `Disconnected -> Connecting ->
//! Connected`, with attempts spaced at a fixed short interval until either
//! success or an elapsed-time budget is exhausted. A failed budget reports
//! [`Error::ConnectionTimeout`] and leaves the link `Disconnected`; the
//! caller retries on a later cycle and keeps rendering last-known data in
//! the meantime. No attempt is fatal and nothing retries unboundedly.
//!
//! On every fresh broker connection the supervisor restores the three
//! topic-family subscriptions and publishes a retained liveness message on
//! this node's own status topic. The matching `connected=false` will
//! message is registered once at transport construction, so the broker
//! announces unclean disconnects on this node's behalf.

use std::time::Duration;

use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info};

use unishare_types::{NodeIdentity, StatusPayload};

use crate::error::{Error, Result};
use crate::link::{BusLink, NetworkLink};
use crate::topic;

/// Connection state of one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Link is down; attempts may be made on a later cycle.
    Disconnected,
    /// An attempt cycle is in progress.
    Connecting,
    /// Link is up and operational.
    Connected,
}

/// Retry pacing for one connection attempt cycle.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    /// Delay between consecutive attempts.
    pub attempt_interval: Duration,
    /// Total elapsed time allowed for one cycle.
    pub budget: Duration,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self {
            attempt_interval: Duration::from_millis(250),
            budget: Duration::from_secs(10),
        }
    }
}

impl RetryBudget {
    /// Create a budget with the given attempt interval and total budget.
    #[must_use]
    pub fn new(attempt_interval: Duration, budget: Duration) -> Self {
        Self {
            attempt_interval,
            budget,
        }
    }
}

/// Supervises the network link and the bus broker connection for one node.
#[derive(Debug)]
pub struct Supervisor {
    budget: RetryBudget,
    identity: NodeIdentity,
}

impl Supervisor {
    /// Create a supervisor for a node identity.
    #[must_use]
    pub fn new(budget: RetryBudget, identity: NodeIdentity) -> Self {
        Self { budget, identity }
    }

    /// The identity this supervisor announces on the bus.
    #[must_use]
    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    /// Ensure the network link is up, retrying within the budget.
    ///
    /// Already-up links return immediately.
    ///
    /// # Errors
    ///
    /// [`Error::ConnectionTimeout`] once the budget is exhausted; the link
    /// remains down and the caller retries on a later cycle.
    pub async fn ensure_network<N: NetworkLink>(&self, net: &mut N) -> Result<()> {
        if net.is_up() {
            return Ok(());
        }
        debug!("network link down, connecting");
        let started = Instant::now();
        loop {
            let Some(remaining) = self.budget.budget.checked_sub(started.elapsed()) else {
                return Err(Error::ConnectionTimeout {
                    link: "network",
                    budget: self.budget.budget,
                });
            };
            match timeout(remaining, net.bring_up()).await {
                Ok(Ok(())) => break,
                Ok(Err(err)) => debug!(error = %err, "network attempt failed"),
                Err(_) => {
                    return Err(Error::ConnectionTimeout {
                        link: "network",
                        budget: self.budget.budget,
                    });
                }
            }
            sleep(self.budget.attempt_interval).await;
        }
        info!(rssi = net.rssi(), "network link up");
        Ok(())
    }

    /// Ensure the broker connection is up, retrying within the budget.
    ///
    /// On a fresh connection, re-subscribes the roster, telemetry, and
    /// status families and publishes a retained `connected=true` liveness
    /// message on this node's own status topic.
    ///
    /// # Errors
    ///
    /// [`Error::ConnectionTimeout`] once the budget is exhausted, or the
    /// first subscription/publish failure after connecting (the transport
    /// is then left for the next cycle to reconcile).
    pub async fn ensure_bus<B: BusLink>(&self, bus: &mut B) -> Result<()> {
        if bus.is_connected() {
            return Ok(());
        }
        debug!("broker link down, connecting");
        let started = Instant::now();
        loop {
            let Some(remaining) = self.budget.budget.checked_sub(started.elapsed()) else {
                return Err(Error::ConnectionTimeout {
                    link: "broker",
                    budget: self.budget.budget,
                });
            };
            match timeout(remaining, bus.connect()).await {
                Ok(Ok(())) => break,
                Ok(Err(err)) => debug!(error = %err, "broker attempt failed"),
                Err(_) => {
                    return Err(Error::ConnectionTimeout {
                        link: "broker",
                        budget: self.budget.budget,
                    });
                }
            }
            sleep(self.budget.attempt_interval).await;
        }

        bus.subscribe(topic::ROSTER).await?;
        bus.subscribe(topic::TELEMETRY_FILTER).await?;
        bus.subscribe(topic::STATUS_FILTER).await?;

        let liveness = StatusPayload::online().encode()?;
        bus.publish(&topic::status_topic(&self.identity.id), liveness, true)
            .await?;

        info!("broker connected, subscriptions restored, liveness announced");
        Ok(())
    }

    /// Observed state of a bus link, derived rather than stored.
    #[must_use]
    pub fn bus_state<B: BusLink>(bus: &B) -> LinkState {
        if bus.is_connected() {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        }
    }
}

#[cfg(test)]
mod tests {
    use unishare_types::DeviceId;

    use super::*;
    use crate::mock::{MockBus, MockNetwork};

    fn supervisor(budget: RetryBudget) -> Supervisor {
        let identity = NodeIdentity::new(DeviceId::new("AA11BB22").unwrap(), "screen", "screen1");
        Supervisor::new(budget, identity)
    }

    fn quick_budget() -> RetryBudget {
        RetryBudget::new(Duration::from_millis(100), Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn connected_bus_is_a_no_op() {
        let supervisor = supervisor(quick_budget());
        let mut bus = MockBus::new();
        supervisor.ensure_bus(&mut bus).await.unwrap();
        let published_before = bus.published.len();
        supervisor.ensure_bus(&mut bus).await.unwrap();
        // No fresh subscriptions or liveness on the no-op path.
        assert_eq!(bus.published.len(), published_before);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_connection_restores_subscriptions_and_liveness() {
        let supervisor = supervisor(quick_budget());
        let mut bus = MockBus::new();
        supervisor.ensure_bus(&mut bus).await.unwrap();

        assert_eq!(
            bus.subscriptions,
            vec![
                topic::ROSTER.to_string(),
                topic::TELEMETRY_FILTER.to_string(),
                topic::STATUS_FILTER.to_string(),
            ]
        );
        let liveness = bus.published.last().unwrap();
        assert_eq!(liveness.topic, "unishare/devices/status/AA11BB22");
        assert!(liveness.retain);
        assert_eq!(liveness.payload, br#"{"connected":true}"#.to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried_within_budget() {
        let supervisor = supervisor(quick_budget());
        let mut bus = MockBus::with_connect_failures(3);
        supervisor.ensure_bus(&mut bus).await.unwrap();
        assert!(bus.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_reports_timeout_and_stays_disconnected() {
        let supervisor = supervisor(quick_budget());
        let mut bus = MockBus::always_failing();
        let err = supervisor.ensure_bus(&mut bus).await.unwrap_err();
        assert!(matches!(err, Error::ConnectionTimeout { link: "broker", .. }));
        assert!(!bus.is_connected());
        assert_eq!(Supervisor::bus_state(&bus), LinkState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn network_budget_is_bounded_too() {
        let supervisor = supervisor(quick_budget());
        let mut net = MockNetwork::always_failing();
        let err = supervisor.ensure_network(&mut net).await.unwrap_err();
        assert!(matches!(err, Error::ConnectionTimeout { link: "network", .. }));
        assert!(!net.is_up());

        let mut net = MockNetwork::new();
        supervisor.ensure_network(&mut net).await.unwrap();
        assert!(net.is_up());
    }
}
