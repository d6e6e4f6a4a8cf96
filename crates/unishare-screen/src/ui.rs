//! Paging, debounce, and rendering for the two-button UI.
//!
//! The two physical buttons arrive as edge events stamped at interrupt
//! time; debounce compares those timestamps only, so the accept/reject
//! decision is independent of how long the main loop takes to get around
//! to rendering. Rendering itself always happens in the main loop, never
//! in input context.

use std::time::Duration;

use tokio::time::Instant;

use unishare_core::DeviceRegistry;
use unishare_types::SensorState;

use crate::display::Frame;

/// Which field of the selected device is rendered.
///
/// Variants are in paging order; [`next`](DisplayMode::next) wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Relative humidity.
    #[default]
    Humidity,
    /// Temperature.
    Temperature,
    /// Apparent (heat-index) temperature.
    ApparentTemperature,
    /// Ambient light state.
    Light,
    /// Flame detector state.
    Flame,
    /// Remote node's signal strength.
    Signal,
}

impl DisplayMode {
    /// Number of display modes.
    pub const COUNT: usize = 6;

    /// The next mode in paging order, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Humidity => DisplayMode::Temperature,
            DisplayMode::Temperature => DisplayMode::ApparentTemperature,
            DisplayMode::ApparentTemperature => DisplayMode::Light,
            DisplayMode::Light => DisplayMode::Flame,
            DisplayMode::Flame => DisplayMode::Signal,
            DisplayMode::Signal => DisplayMode::Humidity,
        }
    }

    /// The label rendered on the top display line.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Humidity => "Humidity:",
            DisplayMode::Temperature => "Temp:",
            DisplayMode::ApparentTemperature => "Apparent temp:",
            DisplayMode::Light => "Light:",
            DisplayMode::Flame => "Fire:",
            DisplayMode::Signal => "WiFi Signal:",
        }
    }

    fn value_line(self, state: &SensorState) -> String {
        match self {
            DisplayMode::Humidity => format!("{:.2} %", state.humidity),
            DisplayMode::Temperature => format!("{:.2} C", state.temperature),
            DisplayMode::ApparentTemperature => format!("{:.2} C", state.apparent_temperature),
            DisplayMode::Light => if state.light { "ON" } else { "OFF" }.to_string(),
            DisplayMode::Flame => if state.flame { "YES" } else { "NO" }.to_string(),
            DisplayMode::Signal => format!("{} dB", state.rssi),
        }
    }
}

/// The two physical inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Advance to the next telemetry field.
    FieldAdvance,
    /// Advance to the next device.
    DeviceAdvance,
}

/// One input edge, stamped where it occurred.
#[derive(Debug, Clone, Copy)]
pub struct ButtonEdge {
    /// Which button fired.
    pub event: ButtonEvent,
    /// When the edge was observed.
    pub at: Instant,
}

impl ButtonEdge {
    /// Stamp an edge at the current instant.
    #[must_use]
    pub fn now(event: ButtonEvent) -> Self {
        Self {
            event,
            at: Instant::now(),
        }
    }
}

/// Timestamp-based debounce for one input.
///
/// Edges closer than the window to the last *accepted* edge are dropped.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    /// Whether an edge at `at` is accepted; accepted edges arm the window.
    pub fn accept(&mut self, at: Instant) -> bool {
        match self.last_accepted {
            Some(last) if at.duration_since(last) < self.window => false,
            _ => {
                self.last_accepted = Some(at);
                true
            }
        }
    }
}

/// Selection and mode cursors plus the render contract.
#[derive(Debug, Default)]
pub struct UiController {
    selection: usize,
    mode: DisplayMode,
}

impl UiController {
    /// Create a controller at the first device and first mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected device index.
    #[must_use]
    pub fn selection(&self) -> usize {
        self.selection
    }

    /// Currently selected display mode.
    #[must_use]
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Handle the field-advance input.
    pub fn advance_field(&mut self) {
        self.mode = self.mode.next();
    }

    /// Handle the device-advance input against the registry's paging bound.
    ///
    /// With zero devices the selection pins to 0 and the next render shows
    /// the fixed "no devices" frame.
    pub fn advance_device(&mut self, registry: &DeviceRegistry) {
        let bound = registry.paging_len();
        if bound == 0 {
            self.selection = 0;
        } else {
            self.selection = (self.selection + 1) % bound;
        }
    }

    /// Render the current `(selection, mode)` pair.
    ///
    /// The selection is reduced modulo the paging bound at render time so a
    /// roster that shrank since the last input cannot page out of range. A
    /// bound that addresses an unpopulated slot (roster longer than the
    /// registry holds) renders the "no data" frame.
    #[must_use]
    pub fn render(&self, registry: &DeviceRegistry) -> Frame {
        let bound = registry.paging_len();
        if bound == 0 {
            return Frame::no_devices();
        }
        match registry.get(self.selection % bound) {
            Some(state) => Frame::new(self.mode.label(), self.mode.value_line(state)),
            None => Frame::no_data(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use unishare_core::{BusMessage, apply};
    use unishare_types::{DeviceId, TelemetryField, TelemetryValue};

    use super::*;

    fn registry_with(ids: &[&str]) -> DeviceRegistry {
        let mut registry = DeviceRegistry::default();
        let roster = ids.iter().map(|raw| DeviceId::new(raw).unwrap()).collect();
        apply(&mut registry, BusMessage::Roster(roster));
        registry
    }

    #[test]
    fn mode_paging_wraps_after_six() {
        let mut mode = DisplayMode::default();
        for _ in 0..DisplayMode::COUNT {
            mode = mode.next();
        }
        assert_eq!(mode, DisplayMode::Humidity);
    }

    #[test]
    fn device_paging_wraps_modulo_count() {
        let registry = registry_with(&["A1", "B2", "C3"]);
        let mut ui = UiController::new();
        ui.advance_device(&registry);
        assert_eq!(ui.selection(), 1);
        ui.advance_device(&registry);
        ui.advance_device(&registry);
        assert_eq!(ui.selection(), 0);
    }

    #[test]
    fn zero_devices_renders_the_fixed_frame() {
        let registry = DeviceRegistry::default();
        let mut ui = UiController::new();
        ui.advance_device(&registry);
        assert_eq!(ui.selection(), 0);
        assert_eq!(ui.render(&registry), Frame::no_devices());
    }

    #[test]
    fn render_formats_every_mode() {
        let mut registry = registry_with(&["A1"]);
        for (field, value) in [
            (TelemetryField::Humidity, TelemetryValue::Float(55.5)),
            (TelemetryField::Temperature, TelemetryValue::Float(23.5)),
            (TelemetryField::ApparentTemperature, TelemetryValue::Float(25.75)),
            (TelemetryField::Light, TelemetryValue::Bool(true)),
            (TelemetryField::Flame, TelemetryValue::Bool(false)),
            (TelemetryField::Rssi, TelemetryValue::Signal(-67)),
        ] {
            apply(
                &mut registry,
                BusMessage::Telemetry {
                    id: DeviceId::new("A1").unwrap(),
                    field,
                    value,
                },
            );
        }

        let mut ui = UiController::new();
        let expected = [
            ("Humidity:", "55.50 %"),
            ("Temp:", "23.50 C"),
            ("Apparent temp:", "25.75 C"),
            ("Light:", "ON"),
            ("Fire:", "NO"),
            ("WiFi Signal:", "-67 dB"),
        ];
        for (label, value) in expected {
            assert_eq!(ui.render(&registry), Frame::new(label, value));
            ui.advance_field();
        }
        // Wrapped all the way around.
        assert_eq!(ui.mode(), DisplayMode::Humidity);
    }

    #[test]
    fn shrunken_roster_cannot_page_out_of_range() {
        let mut registry = registry_with(&["A1", "B2", "C3"]);
        let mut ui = UiController::new();
        ui.advance_device(&registry);
        ui.advance_device(&registry);
        assert_eq!(ui.selection(), 2);

        // A shorter roster arrives; render reduces the stale selection.
        apply(
            &mut registry,
            BusMessage::Roster(vec![DeviceId::new("A1").unwrap()]),
        );
        assert_eq!(registry.paging_len(), 1);
        assert_eq!(ui.render(&registry), Frame::new("Humidity:", "0.00 %"));
    }

    #[test]
    fn overlong_roster_renders_no_data_for_unpopulated_slots() {
        let mut registry = DeviceRegistry::new(2);
        apply(
            &mut registry,
            BusMessage::Roster(vec![
                DeviceId::new("A1").unwrap(),
                DeviceId::new("A1").unwrap(),
            ]),
        );
        // Bound is 2 but only one slot is populated.
        let mut ui = UiController::new();
        ui.advance_device(&registry);
        assert_eq!(ui.render(&registry), Frame::no_data());
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_drops_edges_inside_the_window() {
        let mut debouncer = Debouncer::new(Duration::from_millis(200));
        let first = Instant::now();
        assert!(debouncer.accept(first));
        assert!(!debouncer.accept(first + Duration::from_millis(50)));
        assert!(!debouncer.accept(first + Duration::from_millis(199)));
        assert!(debouncer.accept(first + Duration::from_millis(200)));
        // Rejected edges do not re-arm the window.
        assert!(debouncer.accept(first + Duration::from_millis(401)));
    }

    proptest! {
        #[test]
        fn paging_invariants_hold_for_any_event_sequence(
            device_count in 0usize..6,
            events in proptest::collection::vec(0u8..2, 0..64),
        ) {
            let ids: Vec<String> = (0..device_count).map(|i| format!("D{i}")).collect();
            let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let registry = registry_with(&id_refs);
            let mut ui = UiController::new();

            for event in events {
                if event == 0 {
                    ui.advance_field();
                } else {
                    ui.advance_device(&registry);
                }
                if device_count > 0 {
                    prop_assert!(ui.selection() < device_count);
                } else {
                    prop_assert_eq!(ui.selection(), 0);
                    prop_assert_eq!(ui.render(&registry), Frame::no_devices());
                }
            }
        }
    }
}
