//! Shared sensing state and error types
//!
//! Every field of [`SensorCoreState`] has exactly one writing handler. The
//! main loop reads anything, but only ever clears flags or resets buffers.

mod sensor_core;
mod shared;

pub use sensor_core::*;
pub use shared::*;

use thiserror_no_std::Error;

use crate::clock::CalendarSnapshots;
use crate::config::{BATTERY_BUFFER_SIZE, DEPTH_BUFFER_SIZE, X_AXIS_BUFFER_SIZE, Y_AXIS_BUFFER_SIZE};
use crate::hal::AdcChannel;
use crate::storage::SampleBuffer;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{channel:?} conversion did not complete after {polls} polls")]
    ConversionTimeout { channel: AdcChannel, polls: u32 },
    #[error("period bounds inverted: low {low} > high {high}")]
    InvalidBounds { low: u16, high: u16 },
    #[error("conversion poll cap must be non-zero")]
    ZeroPollCap,
    #[error("config decode failed: {0}")]
    ConfigDecode(postcard::Error),
    #[error("config encode failed: {0}")]
    ConfigEncode(postcard::Error),
}

/// Buffers, flags and clock readings produced by the interrupt handlers
#[derive(Debug, Clone, Default)]
pub struct SensorCoreState {
    pub(crate) depth: SampleBuffer<DEPTH_BUFFER_SIZE>,
    pub(crate) battery: SampleBuffer<BATTERY_BUFFER_SIZE>,
    pub(crate) x_axis: SampleBuffer<X_AXIS_BUFFER_SIZE>,
    pub(crate) y_axis: SampleBuffer<Y_AXIS_BUFFER_SIZE>,
    pub(crate) water_present: bool,
    pub(crate) netlight_on: bool,
    pub(crate) sim_status: bool,
    pub(crate) midnight_passed: bool,
    pub(crate) calendar: CalendarSnapshots,
}

impl SensorCoreState {
    pub const fn new() -> Self {
        Self {
            depth: SampleBuffer::new(),
            battery: SampleBuffer::new(),
            x_axis: SampleBuffer::new(),
            y_axis: SampleBuffer::new(),
            water_present: false,
            netlight_on: false,
            sim_status: false,
            midnight_passed: false,
            calendar: CalendarSnapshots {
                previous: crate::hal::CalendarTime::new(0, 0, 0, 0, 0, 0),
                current: crate::hal::CalendarTime::new(0, 0, 0, 0, 0, 0),
            },
        }
    }

    pub fn depth(&self) -> &SampleBuffer<DEPTH_BUFFER_SIZE> {
        &self.depth
    }

    pub fn depth_mut(&mut self) -> &mut SampleBuffer<DEPTH_BUFFER_SIZE> {
        &mut self.depth
    }

    pub fn battery(&self) -> &SampleBuffer<BATTERY_BUFFER_SIZE> {
        &self.battery
    }

    pub fn battery_mut(&mut self) -> &mut SampleBuffer<BATTERY_BUFFER_SIZE> {
        &mut self.battery
    }

    pub fn x_axis(&self) -> &SampleBuffer<X_AXIS_BUFFER_SIZE> {
        &self.x_axis
    }

    pub fn x_axis_mut(&mut self) -> &mut SampleBuffer<X_AXIS_BUFFER_SIZE> {
        &mut self.x_axis
    }

    pub fn y_axis(&self) -> &SampleBuffer<Y_AXIS_BUFFER_SIZE> {
        &self.y_axis
    }

    pub fn y_axis_mut(&mut self) -> &mut SampleBuffer<Y_AXIS_BUFFER_SIZE> {
        &mut self.y_axis
    }

    pub fn is_water_present(&self) -> bool {
        self.water_present
    }

    pub fn is_netlight_on(&self) -> bool {
        self.netlight_on
    }

    /// Last recorded level of the modem status line
    pub fn sim_status(&self) -> bool {
        self.sim_status
    }

    pub fn midnight_passed(&self) -> bool {
        self.midnight_passed
    }

    pub fn clear_midnight(&mut self) {
        self.midnight_passed = false;
    }

    /// Read and clear the midnight flag in one step
    pub fn take_midnight(&mut self) -> bool {
        core::mem::take(&mut self.midnight_passed)
    }

    pub fn calendar(&self) -> &CalendarSnapshots {
        &self.calendar
    }

    pub fn snapshot(&self) -> CoreSnapshot {
        CoreSnapshot {
            depth: ChannelStatus::of(&self.depth),
            battery: ChannelStatus::of(&self.battery),
            x_axis: ChannelStatus::of(&self.x_axis),
            y_axis: ChannelStatus::of(&self.y_axis),
            water_present: self.water_present,
            netlight_on: self.netlight_on,
            sim_status: self.sim_status,
            midnight_passed: self.midnight_passed,
        }
    }
}

/// Fill level of one channel buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStatus {
    pub len: usize,
    pub is_full: bool,
}

impl ChannelStatus {
    fn of<const N: usize>(buffer: &SampleBuffer<N>) -> Self {
        Self {
            len: buffer.len(),
            is_full: buffer.is_full(),
        }
    }
}

/// Copy of every polled output, taken in one critical section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreSnapshot {
    pub depth: ChannelStatus,
    pub battery: ChannelStatus,
    pub x_axis: ChannelStatus,
    pub y_axis: ChannelStatus,
    pub water_present: bool,
    pub netlight_on: bool,
    pub sim_status: bool,
    pub midnight_passed: bool,
}

impl CoreSnapshot {
    /// Any channel buffer waiting to be drained
    pub fn any_buffer_full(&self) -> bool {
        self.depth.is_full || self.battery.is_full || self.x_axis.is_full || self.y_axis.is_full
    }
}
