//! Host-side stand-ins for the device peripherals, used by unit tests

use core::cell::Cell;
use core::marker::PhantomData;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};
use heapless::Vec;

use crate::core_state::Board;
use crate::hal::{AdcChannel, AnalogFrontEnd, CalendarClock, CalendarTime, PeriodTimer, Reference};

const OP_LOG: usize = 32;

pub struct MockBoard<'a>(PhantomData<&'a ()>);

impl<'a> Board for MockBoard<'a> {
    type WaterPin = MockPin<'a>;
    type NetlightPin = MockPin<'a>;
    type StatusPin = MockPin<'a>;
    type WaterTimer = MockTimer;
    type NetlightTimer = MockTimer;
    type Adc = MockAdc;
    type Clock = MockClock<'a>;
}

/// Input pin whose level is set by the test through a shared cell
pub struct MockPin<'a> {
    level: &'a Cell<bool>,
    fail: bool,
}

impl<'a> MockPin<'a> {
    pub fn new(level: &'a Cell<bool>) -> Self {
        Self { level, fail: false }
    }

    /// A pin whose every read errors
    pub fn failing(level: &'a Cell<bool>) -> Self {
        Self { level, fail: true }
    }
}

#[derive(Debug)]
pub struct PinFault;

impl embedded_hal::digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl ErrorType for MockPin<'_> {
    type Error = PinFault;
}

impl InputPin for MockPin<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.fail {
            return Err(PinFault);
        }
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|level| !level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOp {
    Stop,
    Read,
    Set(u16),
    Start,
}

/// Timer whose count only moves when the test calls [`MockTimer::advance`]
pub struct MockTimer {
    ticks: u16,
    running: bool,
    ops: Vec<TimerOp, OP_LOG>,
}

impl MockTimer {
    pub fn running() -> Self {
        Self {
            ticks: 0,
            running: true,
            ops: Vec::new(),
        }
    }

    /// Let `ticks` elapse; ignored while stopped
    pub fn advance(&mut self, ticks: u16) {
        if self.running {
            self.ticks = self.ticks.saturating_add(ticks);
        }
    }

    pub fn ticks(&self) -> u16 {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ops(&self) -> &[TimerOp] {
        &self.ops
    }

    fn log(&mut self, op: TimerOp) {
        let _ = self.ops.push(op);
    }
}

impl PeriodTimer for MockTimer {
    fn stop(&mut self) {
        self.running = false;
        self.log(TimerOp::Stop);
    }

    fn counter(&mut self) -> u16 {
        self.log(TimerOp::Read);
        self.ticks
    }

    fn set_counter(&mut self, ticks: u16) {
        self.ticks = ticks;
        self.log(TimerOp::Set(ticks));
    }

    fn start(&mut self) {
        self.running = true;
        self.log(TimerOp::Start);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcOp {
    Channel(AdcChannel),
    Reference(Reference),
    Start,
    Stop,
    Read,
}

/// Converter that completes after a fixed number of polls
///
/// Each conversion yields `1000 + n` for the n-th conversion so tests can tell
/// samples apart.
pub struct MockAdc {
    polls_to_complete: Option<u32>,
    polls_left: u32,
    channel: Option<AdcChannel>,
    reference: Reference,
    running: bool,
    conversions: u16,
    per_channel: [u32; 4],
    ops: Vec<AdcOp, OP_LOG>,
}

impl MockAdc {
    pub fn new(polls_to_complete: u32) -> Self {
        Self {
            polls_to_complete: Some(polls_to_complete),
            polls_left: 0,
            channel: None,
            reference: Reference::default(),
            running: false,
            conversions: 0,
            per_channel: [0; 4],
            ops: Vec::new(),
        }
    }

    /// A converter that never reports completion
    pub fn stuck() -> Self {
        Self {
            polls_to_complete: None,
            ..Self::new(0)
        }
    }

    pub fn ops(&self) -> &[AdcOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
        self.per_channel = [0; 4];
    }

    /// Conversions started on `channel` since the last [`clear_ops`](Self::clear_ops)
    pub fn conversions_on(&self, channel: AdcChannel) -> u32 {
        self.per_channel[channel as usize]
    }

    pub fn reference(&self) -> Reference {
        self.reference
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn log(&mut self, op: AdcOp) {
        let _ = self.ops.push(op);
    }
}

impl AnalogFrontEnd for MockAdc {
    fn select_channel(&mut self, channel: AdcChannel) {
        self.channel = Some(channel);
        self.log(AdcOp::Channel(channel));
    }

    fn select_reference(&mut self, reference: Reference) {
        self.reference = reference;
        self.log(AdcOp::Reference(reference));
    }

    fn start(&mut self) {
        self.running = true;
        self.polls_left = self.polls_to_complete.unwrap_or(0);
        self.conversions = self.conversions.wrapping_add(1);
        if let Some(channel) = self.channel {
            self.per_channel[channel as usize] += 1;
        }
        self.log(AdcOp::Start);
    }

    fn is_conversion_complete(&mut self) -> bool {
        if self.polls_to_complete.is_none() {
            return false;
        }
        if self.polls_left == 0 {
            return true;
        }
        self.polls_left -= 1;
        false
    }

    fn stop(&mut self) {
        self.running = false;
        self.log(AdcOp::Stop);
    }

    fn result(&mut self) -> u16 {
        self.log(AdcOp::Read);
        1000 + self.conversions
    }
}

/// Clock replaying a fixed list of readings, repeating the last one
pub struct MockClock<'a> {
    readings: &'a [CalendarTime],
    next: usize,
}

impl<'a> MockClock<'a> {
    pub fn new(readings: &'a [CalendarTime]) -> Self {
        Self { readings, next: 0 }
    }
}

impl CalendarClock for MockClock<'_> {
    fn now(&mut self) -> CalendarTime {
        let index = self.next.min(self.readings.len().saturating_sub(1));
        self.next += 1;
        self.readings.get(index).copied().unwrap_or_default()
    }
}
