//! Coordinator that owns the core state and every handler

use embedded_hal::digital::InputPin;
use log::{debug, info, trace};

use super::{CoreError, CoreSnapshot, SensorCoreState};
use crate::clock::DayRolloverDetector;
use crate::config::CoreConfig;
use crate::hal::{AdcChannel, AnalogFrontEnd, CalendarClock, PeriodTimer};
use crate::sampling::{AxisSampler, AxisTickReport, SingleChannelTrigger};
use crate::signals::{MonitoredPins, PeriodClassifier, PinChangeDispatcher, PinChangeReport};

/// Concrete peripheral types of a board
pub trait Board {
    type WaterPin: InputPin;
    type NetlightPin: InputPin;
    type StatusPin: InputPin;
    type WaterTimer: PeriodTimer;
    type NetlightTimer: PeriodTimer;
    type Adc: AnalogFrontEnd;
    type Clock: CalendarClock;
}

/// Pin-change dispatcher over a board's pins and timers
pub type BoardDispatcher<B> = PinChangeDispatcher<
    <B as Board>::WaterPin,
    <B as Board>::NetlightPin,
    <B as Board>::StatusPin,
    <B as Board>::WaterTimer,
    <B as Board>::NetlightTimer,
>;

/// Peripheral instances handed over to [`SensorCore::new`]
pub struct Peripherals<B: Board> {
    pub pins: MonitoredPins<B::WaterPin, B::NetlightPin, B::StatusPin>,
    pub water_timer: B::WaterTimer,
    pub netlight_timer: B::NetlightTimer,
    pub adc: B::Adc,
    pub clock: B::Clock,
}

/// Outcome of a fast tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastTickOutcome {
    Sampled(AxisTickReport),
    /// A slow-channel conversion owns the converter; this tick was skipped
    Deferred(AdcChannel),
}

/// Owns the sensing state, the peripherals and every interrupt handler.
///
/// Each `on_*` method is the body of one interrupt. They take `&mut self`, so
/// the converter can never be driven by two handlers at once.
pub struct SensorCore<B: Board> {
    state: SensorCoreState,
    dispatcher: BoardDispatcher<B>,
    rollover: DayRolloverDetector<B::Clock>,
    axes: AxisSampler,
    battery: SingleChannelTrigger,
    depth: SingleChannelTrigger,
    adc: B::Adc,
}

impl<B: Board> SensorCore<B> {
    pub fn new(peripherals: Peripherals<B>, config: CoreConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let water = PeriodClassifier::new("water", peripherals.water_timer, config.water)?;
        let netlight =
            PeriodClassifier::new("netlight", peripherals.netlight_timer, config.netlight)?;

        info!(
            "sensor core ready: water [{}, {}], netlight [{}, {}], poll cap {}",
            config.water.low,
            config.water.high,
            config.netlight.low,
            config.netlight.high,
            config.max_conversion_polls
        );

        Ok(Self {
            state: SensorCoreState::new(),
            dispatcher: PinChangeDispatcher::new(peripherals.pins, water, netlight),
            rollover: DayRolloverDetector::new(peripherals.clock),
            axes: AxisSampler::new(config.max_conversion_polls),
            battery: SingleChannelTrigger::new(AdcChannel::Battery),
            depth: SingleChannelTrigger::new(AdcChannel::Depth),
            adc: peripherals.adc,
        })
    }

    /// Seed the calendar snapshots so the first clock tick does not report a
    /// midnight
    pub fn prime_calendar(&mut self) {
        self.rollover.prime(&mut self.state);
    }

    /// Pin-change interrupt
    pub fn on_pin_change(&mut self) -> PinChangeReport {
        self.dispatcher.on_pin_change(&mut self.state)
    }

    /// 1 s clock interrupt
    pub fn on_second_tick(&mut self) -> bool {
        self.rollover.on_second_tick(&mut self.state)
    }

    /// 10 ms accelerometer interrupt.
    ///
    /// `Err` means a conversion exceeded the poll cap; the firmware treats it
    /// as fatal.
    pub fn on_fast_tick(&mut self) -> Result<FastTickOutcome, CoreError> {
        if let Some(pending) = self.pending_conversion() {
            debug!("fast tick deferred: {} conversion in flight", pending.label());
            return Ok(FastTickOutcome::Deferred(pending));
        }

        let report = self.axes.on_fast_tick(
            &mut self.adc,
            &mut self.state.x_axis,
            &mut self.state.y_axis,
        )?;
        Ok(FastTickOutcome::Sampled(report))
    }

    /// Slow battery interrupt: start a conversion and return.
    ///
    /// Restarting the converter on the battery channel abandons any depth
    /// conversion still in flight.
    pub fn on_battery_tick(&mut self) {
        self.depth.abandon();
        self.battery.trigger(&mut self.adc);
    }

    /// Slow depth interrupt: start a conversion and return.
    ///
    /// Abandons any battery conversion still in flight.
    pub fn on_depth_tick(&mut self) {
        self.battery.abandon();
        self.depth.trigger(&mut self.adc);
    }

    /// Converter completion interrupt for `channel`.
    ///
    /// Axis channels complete synchronously inside the fast tick and are
    /// ignored here. Returns `true` if a sample was buffered.
    pub fn on_conversion_complete(&mut self, channel: AdcChannel) -> bool {
        match channel {
            AdcChannel::Battery => self.battery.complete(&mut self.adc, &mut self.state.battery),
            AdcChannel::Depth => self.depth.complete(&mut self.adc, &mut self.state.depth),
            AdcChannel::XAxis | AdcChannel::YAxis => {
                trace!("{} completion handled synchronously", channel.label());
                false
            }
        }
    }

    fn pending_conversion(&self) -> Option<AdcChannel> {
        [&self.battery, &self.depth]
            .into_iter()
            .find(|trigger| trigger.is_pending())
            .map(|trigger| trigger.channel())
    }

    pub fn state(&self) -> &SensorCoreState {
        &self.state
    }

    /// Consumer access for draining buffers and clearing flags
    pub fn state_mut(&mut self) -> &mut SensorCoreState {
        &mut self.state
    }

    pub fn snapshot(&self) -> CoreSnapshot {
        self.state.snapshot()
    }

    pub fn dispatcher_mut(&mut self) -> &mut BoardDispatcher<B> {
        &mut self.dispatcher
    }

    pub fn adc_mut(&mut self) -> &mut B::Adc {
        &mut self.adc
    }
}
