//! Hardware seams consumed by the sensing core
//!
//! The core never touches registers. Everything it needs from the MCU is
//! expressed here as a small trait, implemented by the firmware glue on the
//! device and by mock peripherals on the host. Digital inputs use
//! `embedded_hal::digital::InputPin` directly.

use serde::{Deserialize, Serialize};

/// Analog input routed to the shared converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdcChannel {
    /// Pressure transducer used for water depth
    Depth,
    /// Battery voltage divider
    Battery,
    /// Accelerometer x axis
    XAxis,
    /// Accelerometer y axis
    YAxis,
}

impl AdcChannel {
    /// Short label for log output
    pub const fn label(self) -> &'static str {
        match self {
            Self::Depth => "depth",
            Self::Battery => "battery",
            Self::XAxis => "x-axis",
            Self::YAxis => "y-axis",
        }
    }
}

/// Converter reference voltage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Reference {
    /// Analog supply rail, the high-accuracy reference used for the accelerometer
    Avdd,
    /// Twice the internal band gap; the resting default
    #[default]
    TwoBandgap,
}

/// Free-running hardware timer used to measure the period between edges
///
/// The four operations map one-to-one onto the timer peripheral. Callers are
/// expected to run the stop / read / reset / start sequence without yielding.
pub trait PeriodTimer {
    /// Halt the counter
    fn stop(&mut self);

    /// Current counter value in timer ticks
    fn counter(&mut self) -> u16;

    /// Overwrite the counter register
    fn set_counter(&mut self, ticks: u16);

    /// Resume counting
    fn start(&mut self);
}

/// The single analog-to-digital converter shared by every channel
pub trait AnalogFrontEnd {
    /// Route `channel` to the sample-and-hold input
    fn select_channel(&mut self, channel: AdcChannel);

    /// Switch the conversion reference
    fn select_reference(&mut self, reference: Reference);

    /// Begin sampling and converting
    fn start(&mut self);

    /// Poll the completion status bit
    fn is_conversion_complete(&mut self) -> bool;

    /// Power down the converter after a conversion
    fn stop(&mut self);

    /// Result register of the last completed conversion
    fn result(&mut self) -> u16;
}

/// Broken-down calendar time as returned by the real-time clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalendarTime {
    pub year: u16,
    /// 1-12
    pub month: u8,
    /// 1-31, or 0 before the first clock read
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl CalendarTime {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }
}

/// Real-time clock read over the external bus
///
/// Treated as blocking and infallible at this layer. Retries on the bus are
/// the driver's business.
pub trait CalendarClock {
    fn now(&mut self) -> CalendarTime;
}
