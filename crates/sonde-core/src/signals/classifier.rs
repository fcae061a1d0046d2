use log::trace;

use crate::config::PeriodBounds;
use crate::core_state::CoreError;
use crate::hal::PeriodTimer;

/// Classifies a signal as active when the time between two of its
/// transitions falls inside an inclusive tick range.
///
/// One instance exists per measured signal, each driving its own timer. Every
/// call runs a full measure / reset / restart cycle on that timer; nothing is
/// averaged across calls.
pub struct PeriodClassifier<T> {
    name: &'static str,
    timer: T,
    bounds: PeriodBounds,
    last_period_ticks: Option<u16>,
}

impl<T: PeriodTimer> PeriodClassifier<T> {
    /// Create a classifier over `timer`, rejecting inverted bounds
    pub fn new(name: &'static str, timer: T, bounds: PeriodBounds) -> Result<Self, CoreError> {
        bounds.validate()?;
        Ok(Self {
            name,
            timer,
            bounds,
            last_period_ticks: None,
        })
    }

    /// Measure the ticks since the previous call and restart the timer.
    ///
    /// Must run without interruption between `stop` and `start`, otherwise
    /// the next measurement drifts. On the device this holds because it runs
    /// inside the pin-change interrupt.
    pub fn classify(&mut self) -> bool {
        self.timer.stop();
        let ticks = self.timer.counter();
        let active = self.bounds.contains(ticks);
        self.timer.set_counter(0);
        self.timer.start();

        self.last_period_ticks = Some(ticks);
        trace!(
            "{}: {} ticks in [{}, {}] -> {}",
            self.name, ticks, self.bounds.low, self.bounds.high, active
        );
        active
    }

    /// Ticks measured by the most recent classification
    pub fn last_period_ticks(&self) -> Option<u16> {
        self.last_period_ticks
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }
}
