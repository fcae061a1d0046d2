use embedded_hal::digital::InputPin;
use log::{debug, warn};

use super::{PeriodClassifier, SignalEdgeState};
use crate::core_state::SensorCoreState;
use crate::hal::PeriodTimer;

/// What a single pin-change dispatch did
///
/// Each field holds the classification (or, for the status pin, the new
/// level) produced by this dispatch, or `None` when that signal did not move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinChangeReport {
    pub water_present: Option<bool>,
    pub netlight_on: Option<bool>,
    pub sim_status: Option<bool>,
}

impl PinChangeReport {
    /// True when the interrupt fired but no monitored level changed
    pub fn is_spurious(&self) -> bool {
        self.water_present.is_none() && self.netlight_on.is_none() && self.sim_status.is_none()
    }
}

/// The three monitored inputs
pub struct MonitoredPins<W, N, S> {
    /// Water-presence sensor oscillator output
    pub water: W,
    /// Modem network-status LED line
    pub netlight: N,
    /// Modem power/status line
    pub sim_status: S,
}

/// Single entry point for the shared pin-change interrupt
///
/// The hardware raises one interrupt for any monitored pin, possibly for
/// several at once, so every dispatch compares all three inputs against their
/// last known level.
pub struct PinChangeDispatcher<W, N, S, TW, TN> {
    pins: MonitoredPins<W, N, S>,
    water: PeriodClassifier<TW>,
    netlight: PeriodClassifier<TN>,
    water_edge: SignalEdgeState,
    netlight_edge: SignalEdgeState,
    status_edge: SignalEdgeState,
}

impl<W, N, S, TW, TN> PinChangeDispatcher<W, N, S, TW, TN>
where
    W: InputPin,
    N: InputPin,
    S: InputPin,
    TW: PeriodTimer,
    TN: PeriodTimer,
{
    pub fn new(
        pins: MonitoredPins<W, N, S>,
        water: PeriodClassifier<TW>,
        netlight: PeriodClassifier<TN>,
    ) -> Self {
        Self {
            pins,
            water,
            netlight,
            water_edge: SignalEdgeState::default(),
            netlight_edge: SignalEdgeState::default(),
            status_edge: SignalEdgeState::default(),
        }
    }

    /// Handle one pin-change interrupt.
    ///
    /// No comparison short-circuits another. A pin that cannot be read is
    /// treated as unchanged for this dispatch.
    pub fn on_pin_change(&mut self, state: &mut SensorCoreState) -> PinChangeReport {
        let mut report = PinChangeReport::default();

        if let Some(level) = read_level(&mut self.pins.water, "water") {
            if self.water_edge.update(level).is_some() {
                let present = self.water.classify();
                state.water_present = present;
                report.water_present = Some(present);
            }
        }

        if let Some(level) = read_level(&mut self.pins.netlight, "netlight") {
            if self.netlight_edge.update(level).is_some() {
                let on = self.netlight.classify();
                state.netlight_on = on;
                report.netlight_on = Some(on);
            }
        }

        if let Some(level) = read_level(&mut self.pins.sim_status, "sim status") {
            if let Some(level) = self.status_edge.update(level) {
                state.sim_status = level;
                report.sim_status = Some(level);
            }
        }

        if report.is_spurious() {
            debug!("pin change with no level change");
        }
        report
    }

    pub fn water_classifier(&self) -> &PeriodClassifier<TW> {
        &self.water
    }

    pub fn water_classifier_mut(&mut self) -> &mut PeriodClassifier<TW> {
        &mut self.water
    }

    pub fn netlight_classifier(&self) -> &PeriodClassifier<TN> {
        &self.netlight
    }

    pub fn netlight_classifier_mut(&mut self) -> &mut PeriodClassifier<TN> {
        &mut self.netlight
    }
}

fn read_level<P: InputPin>(pin: &mut P, name: &str) -> Option<bool> {
    match pin.is_high() {
        Ok(level) => Some(level),
        Err(e) => {
            warn!("{} pin read failed: {:?}", name, e);
            None
        }
    }
}
