//! MQTT bus transport.
//!
//! [`RumqttBus`] drives a `rumqttc` client behind the [`BusLink`] seam. The
//! broker-held will message (`connected=false`, retained) is registered at
//! construction so an unclean disconnect is announced without this node's
//! involvement. Session state is kept across reconnects and all traffic
//! uses QoS 1, matching the fleet's at-least-once contract (duplicates are
//! tolerated by the ingest path).

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, LastWill, MqttOptions, Packet, QoS};
use tracing::{debug, trace};

use unishare_core::{BusLink, Error, IncomingMessage, Result, topic};
use unishare_types::{NodeIdentity, StatusPayload};

use crate::config::BrokerConfig;

/// Event-loop channel capacity.
const CHANNEL_CAPACITY: usize = 64;

/// `rumqttc`-backed bus link.
pub struct RumqttBus {
    client: AsyncClient,
    eventloop: rumqttc::EventLoop,
    connected: bool,
}

impl std::fmt::Debug for RumqttBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RumqttBus")
            .field("connected", &self.connected)
            .finish()
    }
}

impl RumqttBus {
    /// Build the transport for a broker and node identity.
    ///
    /// Registers the retained `connected=false` will on this node's own
    /// status topic; the broker publishes it if the session dies uncleanly.
    pub fn new(config: &BrokerConfig, identity: &NodeIdentity) -> Result<Self> {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive));
        options.set_clean_session(false);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username, password);
        }

        let will_payload = StatusPayload::offline().encode()?;
        options.set_last_will(LastWill::new(
            topic::status_topic(&identity.id),
            will_payload,
            QoS::AtLeastOnce,
            true,
        ));

        let (client, eventloop) = AsyncClient::new(options, CHANNEL_CAPACITY);
        Ok(Self {
            client,
            eventloop,
            connected: false,
        })
    }
}

#[async_trait]
impl BusLink for RumqttBus {
    async fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Ok(());
        }
        // Drive the event loop until the broker acknowledges the session.
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code == ConnectReturnCode::Success {
                        debug!(session_present = ack.session_present, "broker accepted session");
                        self.connected = true;
                        return Ok(());
                    }
                    return Err(Error::Bus(format!("broker refused session: {:?}", ack.code)));
                }
                Ok(event) => trace!(?event, "pre-connect event"),
                Err(err) => {
                    self.connected = false;
                    return Err(Error::Bus(err.to_string()));
                }
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn subscribe(&mut self, filter: &str) -> Result<()> {
        self.client
            .subscribe(filter, QoS::AtLeastOnce)
            .await
            .map_err(|err| Error::Bus(err.to_string()))
    }

    async fn publish(&mut self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<()> {
        self.client
            .publish(topic, QoS::AtLeastOnce, retain, payload)
            .await
            .map_err(|err| Error::Bus(err.to_string()))
    }

    async fn poll(&mut self) -> Result<Option<IncomingMessage>> {
        match self.eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => Ok(Some(IncomingMessage {
                topic: publish.topic.clone(),
                payload: publish.payload.to_vec(),
            })),
            Ok(Event::Incoming(Packet::Disconnect)) => {
                self.connected = false;
                Err(Error::Bus("broker sent disconnect".to_string()))
            }
            Ok(event) => {
                trace!(?event, "bus event");
                Ok(None)
            }
            Err(err) => {
                self.connected = false;
                Err(Error::Bus(err.to_string()))
            }
        }
    }
}
