//! Core state machine for unishare nodes.
//!
//! This crate implements the screen node's hardest problem: a bounded,
//! mutable table of remote sensor devices discovered dynamically from bus
//! traffic, kept current from a stream of topically-addressed messages,
//! behind links whose lifecycle is supervised with bounded retries.
//!
//! # Components
//!
//! - **Topic codec** ([`topic`]): classifies inbound topics into the three
//!   message families and extracts embedded identifiers.
//! - **Device registry** ([`registry`]): fixed-capacity, append-only table
//!   keyed by canonical identifier.
//! - **Telemetry ingest** ([`ingest`]): applies decoded messages to the
//!   registry; rendering is driven separately by the UI.
//! - **Connection supervisor** ([`supervisor`]): bounded-retry state machine
//!   for the network link and the bus broker, with re-subscription and a
//!   retained liveness announcement on every fresh broker connection.
//! - **Setup announcer** ([`announce`]): one-shot self-registration once
//!   connectivity is established.
//! - **Link seams** ([`link`], [`mock`]): async traits for the bus and the
//!   network radio, plus scriptable mock implementations for tests.
//!
//! Messages may be lost or duplicated; every component tolerates both. No
//! error in this crate is fatal to a node: a disconnected link degrades to
//! last-known-data rendering and reconnection is retried on later cycles.

pub mod announce;
pub mod error;
pub mod ingest;
pub mod link;
pub mod mock;
pub mod registry;
pub mod supervisor;
pub mod topic;

pub use announce::SetupAnnouncer;
pub use error::{Error, Result};
pub use ingest::{Applied, apply};
pub use link::{BusLink, IncomingMessage, NetworkLink};
pub use mock::{MockBus, MockNetwork, Published};
pub use registry::{DEFAULT_CAPACITY, DeviceRegistry};
pub use supervisor::{LinkState, RetryBudget, Supervisor};
pub use topic::BusMessage;

// Re-export the data model for downstream convenience
pub use unishare_types::{
    DeviceId, NodeIdentity, SensorState, TelemetryField, TelemetryValue,
};
