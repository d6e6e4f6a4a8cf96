//! Screen node: renders fleet telemetry to a two-line display.
//!
//! The node subscribes to the unishare bus, maintains the device registry
//! from roster/telemetry/status traffic, and pages across devices and
//! fields on two debounced button inputs. Rendering targets any
//! [`display::DisplayLink`]; the bundled implementation draws to the
//! terminal as a stand-in for the character LCD.

pub mod config;
pub mod display;
pub mod mqtt;
pub mod net;
pub mod node;
pub mod ui;

pub use config::{Config, ConfigError};
pub use display::{DisplayError, DisplayLink, Frame, TerminalDisplay};
pub use mqtt::RumqttBus;
pub use net::HostNetwork;
pub use node::ScreenNode;
pub use ui::{ButtonEdge, ButtonEvent, Debouncer, DisplayMode, UiController};
