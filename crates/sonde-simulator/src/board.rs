//! Synthetic peripherals driven by a shared simulated clock.
//!
//! Every peripheral derives its state from the simulated microsecond counter,
//! so the main loop only has to advance time and fire interrupts.

use std::convert::Infallible;
use std::f64::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use embedded_hal::digital::{ErrorType, InputPin};
use sonde_core::core_state::Board;
use sonde_core::hal::{
    AdcChannel, AnalogFrontEnd, CalendarClock, CalendarTime, PeriodTimer, Reference,
};

/// Period timers count at 15.625 kHz (4 MHz / 256)
pub const TIMER_HZ: u64 = 15_625;

/// Water oscillator half period while dry, in ms
const DRY_HALF_PERIOD_MS: u64 = 30;
/// Water oscillator half period once submerged, in ms
const WET_HALF_PERIOD_MS: u64 = 10;

/// Modem netlight when registered: 64 ms on, 3 s off
const NETLIGHT_ON_MS: u64 = 64;
const NETLIGHT_OFF_MS: u64 = 3_000;

/// Simulated time in microseconds, shared by every peripheral
#[derive(Clone, Default)]
pub struct SimTime(Arc<AtomicU64>);

impl SimTime {
    pub fn now_us(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn now_ms(&self) -> u64 {
        self.now_us() / 1_000
    }

    pub fn advance_us(&self, us: u64) {
        self.0.fetch_add(us, Ordering::Relaxed);
    }
}

pub struct SimBoard;

impl Board for SimBoard {
    type WaterPin = SimPin;
    type NetlightPin = SimPin;
    type StatusPin = SimPin;
    type WaterTimer = SimTimer;
    type NetlightTimer = SimTimer;
    type Adc = SimAdc;
    type Clock = SimClock;
}

#[derive(Debug, Clone, Copy)]
pub enum Line {
    Water { submerged_at_ms: u64 },
    Netlight,
    SimStatus { powered_at_ms: u64 },
}

pub struct SimPin {
    line: Line,
    time: SimTime,
}

impl SimPin {
    pub fn new(line: Line, time: SimTime) -> Self {
        Self { line, time }
    }

    pub fn level(&self) -> bool {
        level_at(self.line, self.time.now_ms())
    }
}

/// Level of `line` at `t` milliseconds
pub fn level_at(line: Line, t: u64) -> bool {
    match line {
        Line::Water { submerged_at_ms } => {
            let half = if t < submerged_at_ms {
                DRY_HALF_PERIOD_MS
            } else {
                WET_HALF_PERIOD_MS
            };
            (t / half) % 2 == 1
        }
        Line::Netlight => t % (NETLIGHT_ON_MS + NETLIGHT_OFF_MS) < NETLIGHT_ON_MS,
        Line::SimStatus { powered_at_ms } => t >= powered_at_ms,
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level())
    }
}

/// 16-bit up-counter clocked at [`TIMER_HZ`]
pub struct SimTimer {
    time: SimTime,
    base: u16,
    started_at_us: Option<u64>,
}

impl SimTimer {
    pub fn new(time: SimTime) -> Self {
        let started_at_us = Some(time.now_us());
        Self {
            time,
            base: 0,
            started_at_us,
        }
    }

    fn elapsed_ticks(&self) -> u16 {
        match self.started_at_us {
            Some(start) => ((self.time.now_us() - start) * TIMER_HZ / 1_000_000) as u16,
            None => 0,
        }
    }
}

impl PeriodTimer for SimTimer {
    fn stop(&mut self) {
        self.base = self.base.wrapping_add(self.elapsed_ticks());
        self.started_at_us = None;
    }

    fn counter(&mut self) -> u16 {
        self.base.wrapping_add(self.elapsed_ticks())
    }

    fn set_counter(&mut self, ticks: u16) {
        self.base = ticks;
        if self.started_at_us.is_some() {
            self.started_at_us = Some(self.time.now_us());
        }
    }

    fn start(&mut self) {
        if self.started_at_us.is_none() {
            self.started_at_us = Some(self.time.now_us());
        }
    }
}

/// 12-bit converter producing synthetic readings per channel
pub struct SimAdc {
    time: SimTime,
    channel: AdcChannel,
    reference: Reference,
    polls_left: u32,
    in_flight: Option<AdcChannel>,
    result: u16,
}

/// Polls a conversion takes before the status bit sets
const CONVERSION_POLLS: u32 = 4;

impl SimAdc {
    pub fn new(time: SimTime) -> Self {
        Self {
            time,
            channel: AdcChannel::Depth,
            reference: Reference::default(),
            polls_left: 0,
            in_flight: None,
            result: 0,
        }
    }

    /// Channel of a started conversion that no handler has stopped yet.
    ///
    /// Stands in for the converter's completion interrupt.
    pub fn take_completed(&mut self) -> Option<AdcChannel> {
        let channel = self.in_flight.take()?;
        self.result = self.sample(channel);
        Some(channel)
    }

    fn sample(&self, channel: AdcChannel) -> u16 {
        let t = self.time.now_us() as f64 / 1_000_000.0;
        let value = match channel {
            AdcChannel::XAxis => 2048.0 + 600.0 * (TAU * 0.5 * t).sin(),
            AdcChannel::YAxis => 2048.0 + 400.0 * (TAU * 0.5 * t).cos(),
            // slow swell on the pressure transducer
            AdcChannel::Depth => 1500.0 + 120.0 * (TAU * t / 60.0).sin(),
            // battery sags a count every ten seconds
            AdcChannel::Battery => 3300.0 - t / 10.0,
        };
        let value = match self.reference {
            Reference::Avdd => value,
            Reference::TwoBandgap => value * 0.9,
        };
        value.clamp(0.0, 4095.0) as u16
    }
}

impl AnalogFrontEnd for SimAdc {
    fn select_channel(&mut self, channel: AdcChannel) {
        self.channel = channel;
    }

    fn select_reference(&mut self, reference: Reference) {
        self.reference = reference;
    }

    fn start(&mut self) {
        self.polls_left = CONVERSION_POLLS;
        self.in_flight = Some(self.channel);
    }

    fn is_conversion_complete(&mut self) -> bool {
        if self.polls_left == 0 {
            return true;
        }
        self.polls_left -= 1;
        false
    }

    fn stop(&mut self) {
        if let Some(channel) = self.in_flight.take() {
            self.result = self.sample(channel);
        }
    }

    fn result(&mut self) -> u16 {
        self.result
    }
}

/// Real-time clock running from a fixed start date
pub struct SimClock {
    time: SimTime,
    start: CalendarTime,
}

impl SimClock {
    pub fn new(time: SimTime, start: CalendarTime) -> Self {
        Self { time, start }
    }
}

impl CalendarClock for SimClock {
    fn now(&mut self) -> CalendarTime {
        advance(self.start, self.time.now_ms() / 1_000)
    }
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// `start` plus `secs` seconds
fn advance(start: CalendarTime, secs: u64) -> CalendarTime {
    let start_of_day =
        start.hour as u64 * 3_600 + start.minute as u64 * 60 + start.second as u64;
    let total = start_of_day + secs;
    let seconds_today = total % 86_400;

    let mut date = start;
    for _ in 0..total / 86_400 {
        date.day += 1;
        if date.day > days_in_month(date.year, date.month) {
            date.day = 1;
            date.month += 1;
            if date.month > 12 {
                date.month = 1;
                date.year += 1;
            }
        }
    }

    date.hour = (seconds_today / 3_600) as u8;
    date.minute = (seconds_today / 60 % 60) as u8;
    date.second = (seconds_today % 60) as u8;
    date
}
