//! Static configuration for the sensing core
//!
//! Buffer capacities are compile-time constants. Everything else lives in
//! [`CoreConfig`], which can be provisioned as a postcard blob in flash.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::core_state::CoreError;

/// Depth samples held before the main loop must drain them
pub const DEPTH_BUFFER_SIZE: usize = 64;
/// One day of half-hourly battery readings
pub const BATTERY_BUFFER_SIZE: usize = 48;
/// One second of accelerometer data at the 10 ms fast tick
pub const X_AXIS_BUFFER_SIZE: usize = 100;
pub const Y_AXIS_BUFFER_SIZE: usize = 100;

/// Upper bound on completion polls during one synchronous conversion.
/// A 12-bit conversion finishes in well under 100 polls on the target.
pub const DEFAULT_MAX_CONVERSION_POLLS: u32 = 10_000;

/// Inclusive range of timer ticks that classifies a signal as active
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBounds {
    pub low: u16,
    pub high: u16,
}

impl PeriodBounds {
    pub const fn new(low: u16, high: u16) -> Self {
        Self { low, high }
    }

    /// `low <= ticks <= high`
    pub const fn contains(&self, ticks: u16) -> bool {
        ticks >= self.low && ticks <= self.high
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.low > self.high {
            return Err(CoreError::InvalidBounds {
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }
}

/// Tick cadences the firmware programs into its periodic timers
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub fast_tick_ms: u32,
    pub clock_tick_ms: u32,
    pub battery_tick_ms: u32,
    pub depth_tick_ms: u32,
}

impl Cadence {
    pub fn fast_tick(&self) -> Duration {
        Duration::from_millis(self.fast_tick_ms as u64)
    }

    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms as u64)
    }

    pub fn battery_tick(&self) -> Duration {
        Duration::from_millis(self.battery_tick_ms as u64)
    }

    pub fn depth_tick(&self) -> Duration {
        Duration::from_millis(self.depth_tick_ms as u64)
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            fast_tick_ms: 10,
            clock_tick_ms: 1_000,
            battery_tick_ms: 30 * 60 * 1_000,
            depth_tick_ms: 60 * 1_000,
        }
    }
}

/// Runtime configuration for the sensing core
///
/// Period bounds are in raw timer ticks (timers run at 15.625 kHz on the
/// device, so 16 bits cover a little over four seconds).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreConfig {
    /// Water-presence oscillator period between edges
    pub water: PeriodBounds,
    /// Modem network-light blink period when registered (about 3 s)
    pub netlight: PeriodBounds,
    /// Busy-wait cap for a single accelerometer conversion
    pub max_conversion_polls: u32,
    pub cadence: Cadence,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            water: PeriodBounds::new(100, 200),
            netlight: PeriodBounds::new(46_000, 48_000),
            max_conversion_polls: DEFAULT_MAX_CONVERSION_POLLS,
            cadence: Cadence::default(),
        }
    }
}

impl CoreConfig {
    /// Check that both bound pairs are ordered and the poll cap is usable
    pub fn validate(&self) -> Result<(), CoreError> {
        self.water.validate()?;
        self.netlight.validate()?;
        if self.max_conversion_polls == 0 {
            return Err(CoreError::ZeroPollCap);
        }
        Ok(())
    }

    /// Decode and validate a postcard-encoded configuration blob
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let config: Self = postcard::from_bytes(bytes).map_err(CoreError::ConfigDecode)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode into `buf`, returning the used prefix
    pub fn to_slice<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], CoreError> {
        postcard::to_slice(self, buf).map_err(CoreError::ConfigEncode)
    }
}
