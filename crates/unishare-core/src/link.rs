//! Trait seams for the external links a node depends on.
//!
//! The bus client and the network radio are external collaborators; these
//! traits model the operations the core needs and nothing else, so the
//! state machine can be exercised against the mock implementations in
//! [`crate::mock`] and driven in production by a real transport.

use async_trait::async_trait;

use crate::error::Result;

/// One inbound publish delivered by the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Full topic string.
    pub topic: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

/// The message-bus client seam.
///
/// Methods take `&mut self`: a node owns its transport and drives it from
/// a single task, matching the run-to-completion scheduling model. A
/// transport reports lost connections by returning an error from
/// [`poll`](BusLink::poll) and flipping [`is_connected`](BusLink::is_connected);
/// the supervisor reconnects on a later cycle.
#[async_trait]
pub trait BusLink: Send {
    /// Make one connection attempt. Must be a no-op when already connected.
    async fn connect(&mut self) -> Result<()>;

    /// Whether the link currently considers itself connected.
    fn is_connected(&self) -> bool;

    /// Subscribe to a topic filter.
    async fn subscribe(&mut self, filter: &str) -> Result<()>;

    /// Publish a payload, optionally retained by the broker.
    async fn publish(&mut self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<()>;

    /// Wait for the next inbound message.
    ///
    /// Returns `Ok(None)` when the transport made progress without
    /// delivering a publish (keep-alive traffic, acknowledgements).
    async fn poll(&mut self) -> Result<Option<IncomingMessage>>;
}

/// The network-radio seam.
///
/// Radio management beyond connect semantics is out of scope; the core
/// only needs to bring the link up with a bounded budget and read its
/// signal strength.
#[async_trait]
pub trait NetworkLink: Send {
    /// Make one attempt to bring the link up. No-op when already up.
    async fn bring_up(&mut self) -> Result<()>;

    /// Whether the link is currently up.
    fn is_up(&self) -> bool;

    /// Signal strength of this node's own link, dBm-like.
    fn rssi(&self) -> i64;
}
