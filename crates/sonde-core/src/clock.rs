//! Midnight detection from the once-per-second clock tick

use log::{debug, info};

use crate::core_state::SensorCoreState;
use crate::hal::{CalendarClock, CalendarTime};

/// The two most recent clock readings
///
/// `current` is always the latest read; `previous` is whatever `current` held
/// just before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarSnapshots {
    pub previous: CalendarTime,
    pub current: CalendarTime,
}

impl CalendarSnapshots {
    /// Shift `current` into `previous` and store `now`
    pub fn shift_in(&mut self, now: CalendarTime) {
        self.previous = self.current;
        self.current = now;
    }

    /// Day-of-month differs between the two readings.
    ///
    /// Month and year are ignored. With one read per second the day field
    /// changes exactly once per midnight, including 31 -> 1.
    pub fn day_changed(&self) -> bool {
        self.previous.day != self.current.day
    }
}

/// Raises the one-shot midnight flag when the day-of-month changes
pub struct DayRolloverDetector<C> {
    clock: C,
}

impl<C: CalendarClock> DayRolloverDetector<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Seed the snapshots from the clock without raising the flag.
    ///
    /// Without this the first tick compares against the zeroed snapshot and
    /// reports a midnight.
    pub fn prime(&mut self, state: &mut SensorCoreState) {
        let now = self.clock.now();
        state.calendar.previous = now;
        state.calendar.current = now;
        debug!("calendar primed at {:04}-{:02}-{:02}", now.year, now.month, now.day);
    }

    /// Handle the 1 s tick. Returns `true` when this tick crossed midnight.
    ///
    /// The flag is only ever set here; clearing it is the consumer's job.
    pub fn on_second_tick(&mut self, state: &mut SensorCoreState) -> bool {
        let now = self.clock.now();
        state.calendar.shift_in(now);

        if !state.calendar.day_changed() {
            return false;
        }

        state.midnight_passed = true;
        info!(
            "midnight passed: day {} -> {}",
            state.calendar.previous.day, state.calendar.current.day
        );
        true
    }
}
