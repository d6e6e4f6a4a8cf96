//! The screen node's main loop.
//!
//! A single task owns every piece of mutable state and interleaves work at
//! `select!` points only, a cooperative run-to-completion loop: bus
//! traffic mutates the registry, button edges page the cursors, and a
//! periodic tick refreshes the frame and drives reconnection. Registry
//! mutation and rendering can therefore never overlap, and no locking is
//! needed.
//!
//! Connection loss degrades rather than stops the node: the display keeps
//! showing last-known data and the supervisor retries on refresh ticks,
//! each attempt cycle bounded by its elapsed-time budget.

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use unishare_core::{
    BusLink, DeviceRegistry, IncomingMessage, NetworkLink, SetupAnnouncer, Supervisor, apply,
    topic,
};

use crate::config::Config;
use crate::display::{DisplayError, DisplayLink, Frame};
use crate::ui::{ButtonEdge, ButtonEvent, Debouncer, UiController};

/// One unit of work selected by the main loop.
enum Action {
    Shutdown,
    InputClosed,
    Inbound(unishare_core::Result<Option<IncomingMessage>>),
    Edge(ButtonEdge),
    Tick,
}

/// The screen node: registry, cursors, supervised links, display.
pub struct ScreenNode<B, N, D> {
    registry: DeviceRegistry,
    ui: UiController,
    supervisor: Supervisor,
    announcer: SetupAnnouncer,
    bus: B,
    net: N,
    display: D,
    buttons: mpsc::Receiver<ButtonEdge>,
    field_debounce: Debouncer,
    device_debounce: Debouncer,
    refresh_interval: std::time::Duration,
}

impl<B, N, D> ScreenNode<B, N, D>
where
    B: BusLink,
    N: NetworkLink,
    D: DisplayLink,
{
    /// Assemble a node from its configuration, links, and input channel.
    pub fn new(
        config: &Config,
        supervisor: Supervisor,
        bus: B,
        net: N,
        display: D,
        buttons: mpsc::Receiver<ButtonEdge>,
    ) -> Self {
        Self {
            registry: DeviceRegistry::new(config.registry.capacity),
            ui: UiController::new(),
            supervisor,
            announcer: SetupAnnouncer::new(),
            bus,
            net,
            display,
            buttons,
            field_debounce: Debouncer::new(config.buttons.debounce()),
            device_debounce: Debouncer::new(config.buttons.debounce()),
            refresh_interval: config.display.refresh(),
        }
    }

    /// Run until cancelled.
    ///
    /// # Errors
    ///
    /// Only display initialization failure is fatal; every other failure is
    /// logged and retried on a later cycle.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), DisplayError> {
        self.display.init()?;
        self.display.show(&Frame::splash())?;

        self.connect_cycle().await;
        self.render();

        let mut refresh = tokio::time::interval(self.refresh_interval);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a fresh interval completes immediately.
        refresh.tick().await;

        loop {
            // Wait on the bus, the buttons, and the refresh tick from one
            // task; whichever fires is handled to completion before the
            // next wait, so registry mutation and rendering never overlap.
            let bus_up = self.bus.is_connected();
            let action = {
                let Self { bus, buttons, .. } = self;
                tokio::select! {
                    _ = cancel.cancelled() => Action::Shutdown,
                    incoming = bus.poll(), if bus_up => Action::Inbound(incoming),
                    edge = buttons.recv() => match edge {
                        Some(edge) => Action::Edge(edge),
                        None => Action::InputClosed,
                    },
                    _ = refresh.tick() => Action::Tick,
                }
            };

            match action {
                Action::Shutdown => {
                    info!("shutting down");
                    break;
                }
                Action::InputClosed => {
                    info!("input channel closed, shutting down");
                    break;
                }
                Action::Inbound(Ok(Some(message))) => self.handle_incoming(&message),
                Action::Inbound(Ok(None)) => {}
                Action::Inbound(Err(err)) => {
                    warn!(error = %err, "bus poll failed, reconnecting on next tick");
                }
                Action::Edge(edge) => {
                    if self.handle_edge(edge) {
                        self.render();
                    }
                }
                Action::Tick => {
                    self.connect_cycle().await;
                    self.render();
                }
            }
        }

        Ok(())
    }

    /// Decode and ingest one inbound message. Rendering is deferred to the
    /// next input event or refresh tick.
    fn handle_incoming(&mut self, message: &IncomingMessage) {
        match topic::classify(&message.topic, &message.payload) {
            Ok(Some(decoded)) => {
                let applied = apply(&mut self.registry, decoded);
                debug!(topic = %message.topic, ?applied, "ingested message");
            }
            Ok(None) => debug!(topic = %message.topic, "ignored unrouted topic"),
            Err(err) => warn!(topic = %message.topic, error = %err, "dropped undecodable message"),
        }
    }

    /// Debounce and apply one button edge. Returns whether to re-render.
    fn handle_edge(&mut self, edge: ButtonEdge) -> bool {
        let accepted = match edge.event {
            ButtonEvent::FieldAdvance => self.field_debounce.accept(edge.at),
            ButtonEvent::DeviceAdvance => self.device_debounce.accept(edge.at),
        };
        if !accepted {
            debug!(event = ?edge.event, "debounced input edge");
            return false;
        }
        match edge.event {
            ButtonEvent::FieldAdvance => self.ui.advance_field(),
            ButtonEvent::DeviceAdvance => self.ui.advance_device(&self.registry),
        }
        true
    }

    /// Bring the links up (bounded) and fire the one-shot announcement.
    /// Failures degrade to last-known-data rendering; nothing here is fatal.
    async fn connect_cycle(&mut self) {
        if let Err(err) = self.supervisor.ensure_network(&mut self.net).await {
            warn!(error = %err, "network link unavailable");
            return;
        }
        if let Err(err) = self.supervisor.ensure_bus(&mut self.bus).await {
            warn!(error = %err, "broker unavailable");
            return;
        }
        let identity = self.supervisor.identity().clone();
        if let Err(err) = self.announcer.announce(&mut self.bus, &identity).await {
            warn!(error = %err, "setup announcement failed, will retry");
        }
    }

    /// Render the current frame; a failed write is logged, not fatal.
    fn render(&mut self) {
        let frame = self.ui.render(&self.registry);
        if let Err(err) = self.display.show(&frame) {
            warn!(error = %err, "display write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use unishare_core::{MockBus, MockNetwork, NodeIdentity, RetryBudget};
    use unishare_types::DeviceId;

    use super::*;

    /// Records every frame it is shown.
    #[derive(Debug, Default)]
    struct RecordingDisplay {
        frames: Vec<Frame>,
    }

    impl DisplayLink for RecordingDisplay {
        fn init(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }

        fn show(&mut self, frame: &Frame) -> Result<(), DisplayError> {
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    fn test_node(
        bus: MockBus,
    ) -> (
        ScreenNode<MockBus, MockNetwork, RecordingDisplay>,
        mpsc::Sender<ButtonEdge>,
    ) {
        let mut config = Config::default();
        config.node.mac_address = "AA11BB22".to_string();
        let identity = NodeIdentity::new(DeviceId::new("AA11BB22").unwrap(), "screen", "screen1");
        let supervisor = Supervisor::new(
            RetryBudget::new(Duration::from_millis(50), Duration::from_millis(500)),
            identity,
        );
        let (tx, rx) = mpsc::channel(16);
        let node = ScreenNode::new(
            &config,
            supervisor,
            bus,
            MockNetwork::new(),
            RecordingDisplay::default(),
            rx,
        );
        (node, tx)
    }

    #[tokio::test]
    async fn ingest_mutates_registry_without_rendering() {
        let (mut node, _tx) = test_node(MockBus::new());
        node.handle_incoming(&IncomingMessage {
            topic: topic::ROSTER.to_string(),
            payload: br#"[{"MAC_ADDRESS":"AA11BB22"}]"#.to_vec(),
        });
        node.handle_incoming(&IncomingMessage {
            topic: "unishare/sensors/AA11BB22/temperature".to_string(),
            payload: br#"{"value": 23.5}"#.to_vec(),
        });
        assert_eq!(node.registry.get(0).unwrap().temperature, 23.5);
        assert!(node.display.frames.is_empty());
    }

    #[tokio::test]
    async fn undecodable_messages_leave_state_untouched() {
        let (mut node, _tx) = test_node(MockBus::new());
        node.handle_incoming(&IncomingMessage {
            topic: topic::ROSTER.to_string(),
            payload: b"not json".to_vec(),
        });
        node.handle_incoming(&IncomingMessage {
            topic: "unishare/sensors/AA11BB22/temperature".to_string(),
            payload: br#"{"value": 23.5}"#.to_vec(),
        });
        assert!(node.registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn edges_inside_the_debounce_window_do_not_page() {
        let (mut node, _tx) = test_node(MockBus::new());
        node.handle_incoming(&IncomingMessage {
            topic: topic::ROSTER.to_string(),
            payload: br#"[{"MAC_ADDRESS":"A1"},{"MAC_ADDRESS":"B2"}]"#.to_vec(),
        });

        let at = Instant::now();
        assert!(node.handle_edge(ButtonEdge {
            event: ButtonEvent::DeviceAdvance,
            at,
        }));
        assert_eq!(node.ui.selection(), 1);

        // A bounce 50ms later is dropped.
        assert!(!node.handle_edge(ButtonEdge {
            event: ButtonEvent::DeviceAdvance,
            at: at + Duration::from_millis(50),
        }));
        assert_eq!(node.ui.selection(), 1);

        // The two buttons debounce independently.
        assert!(node.handle_edge(ButtonEdge {
            event: ButtonEvent::FieldAdvance,
            at: at + Duration::from_millis(60),
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn connect_cycle_announces_setup_once() {
        let (mut node, _tx) = test_node(MockBus::new());
        node.connect_cycle().await;
        node.connect_cycle().await;

        let setups = node
            .bus
            .published
            .iter()
            .filter(|p| p.topic == topic::SETUP)
            .count();
        assert_eq!(setups, 1);
        // Liveness was announced retained on the node's own status topic.
        assert!(node
            .bus
            .published
            .iter()
            .any(|p| p.topic == "unishare/devices/status/AA11BB22" && p.retain));
    }

    #[tokio::test(start_paused = true)]
    async fn broker_outage_degrades_instead_of_failing() {
        let (mut node, _tx) = test_node(MockBus::always_failing());
        node.connect_cycle().await;
        assert!(!node.bus.is_connected());
        // Rendering still works from last-known (empty) state.
        node.render();
        assert_eq!(node.display.frames.last().unwrap(), &Frame::no_devices());
    }
}
