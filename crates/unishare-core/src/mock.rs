//! Mock link implementations for testing.
//!
//! [`MockBus`] and [`MockNetwork`] implement the link seams without any
//! transport, recording outbound traffic and serving scripted inbound
//! messages and failures. They back the supervisor, announcer, and node
//! tests.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::link::{BusLink, IncomingMessage, NetworkLink};

/// One recorded outbound publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    /// Topic the payload was published to.
    pub topic: String,
    /// Payload bytes.
    pub payload: Vec<u8>,
    /// Whether the broker was asked to retain it.
    pub retain: bool,
}

/// A scriptable in-memory bus.
#[derive(Debug, Default)]
pub struct MockBus {
    connected: bool,
    remaining_connect_failures: u32,
    always_fail_connect: bool,
    fail_next_publish: bool,
    /// Subscriptions recorded in call order.
    pub subscriptions: Vec<String>,
    /// Publishes recorded in call order.
    pub published: Vec<Published>,
    inbound: VecDeque<IncomingMessage>,
}

impl MockBus {
    /// A bus that connects on the first attempt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus whose first `n` connect attempts fail.
    #[must_use]
    pub fn with_connect_failures(n: u32) -> Self {
        Self {
            remaining_connect_failures: n,
            ..Self::default()
        }
    }

    /// A bus that never connects.
    #[must_use]
    pub fn always_failing() -> Self {
        Self {
            always_fail_connect: true,
            ..Self::default()
        }
    }

    /// Make the next publish fail once.
    pub fn fail_next_publish(&mut self) {
        self.fail_next_publish = true;
    }

    /// Queue an inbound message for [`BusLink::poll`].
    pub fn push_incoming(&mut self, topic: impl Into<String>, payload: impl Into<Vec<u8>>) {
        self.inbound.push_back(IncomingMessage {
            topic: topic.into(),
            payload: payload.into(),
        });
    }

    /// Drop the connection, as after a transport error.
    pub fn drop_connection(&mut self) {
        self.connected = false;
    }
}

#[async_trait]
impl BusLink for MockBus {
    async fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Ok(());
        }
        if self.always_fail_connect {
            return Err(Error::Bus("scripted connect failure".to_string()));
        }
        if self.remaining_connect_failures > 0 {
            self.remaining_connect_failures -= 1;
            return Err(Error::Bus("scripted transient connect failure".to_string()));
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn subscribe(&mut self, filter: &str) -> Result<()> {
        if !self.connected {
            return Err(Error::Bus("subscribe while disconnected".to_string()));
        }
        self.subscriptions.push(filter.to_string());
        Ok(())
    }

    async fn publish(&mut self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<()> {
        if self.fail_next_publish {
            self.fail_next_publish = false;
            return Err(Error::Bus("scripted publish failure".to_string()));
        }
        if !self.connected {
            return Err(Error::Bus("publish while disconnected".to_string()));
        }
        self.published.push(Published {
            topic: topic.to_string(),
            payload,
            retain,
        });
        Ok(())
    }

    async fn poll(&mut self) -> Result<Option<IncomingMessage>> {
        if !self.connected {
            return Err(Error::Bus("poll while disconnected".to_string()));
        }
        Ok(self.inbound.pop_front())
    }
}

/// A scriptable network link.
#[derive(Debug, Default)]
pub struct MockNetwork {
    up: bool,
    always_fail: bool,
    rssi: i64,
}

impl MockNetwork {
    /// A link that comes up on the first attempt.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rssi: -55,
            ..Self::default()
        }
    }

    /// A link that never comes up.
    #[must_use]
    pub fn always_failing() -> Self {
        Self {
            always_fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl NetworkLink for MockNetwork {
    async fn bring_up(&mut self) -> Result<()> {
        if self.up {
            return Ok(());
        }
        if self.always_fail {
            return Err(Error::Bus("scripted network failure".to_string()));
        }
        self.up = true;
        Ok(())
    }

    fn is_up(&self) -> bool {
        self.up
    }

    fn rssi(&self) -> i64 {
        self.rssi
    }
}
