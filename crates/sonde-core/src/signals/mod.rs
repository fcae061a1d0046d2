//! Digital signal classification driven by pin-change interrupts
//!
//! Two of the monitored inputs (the water-presence oscillator and the modem
//! network light) are classified by the time between their transitions. The
//! third (modem status) is only tracked.

pub mod classifier;
pub mod dispatcher;

pub use classifier::*;
pub use dispatcher::*;

/// Last observed level of one monitored input
///
/// Dispatch is edge-triggered by comparison: only a net change between two
/// observations counts, so a transition that flips and flips back between
/// interrupts is not seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalEdgeState {
    last: bool,
}

impl SignalEdgeState {
    pub const fn level(&self) -> bool {
        self.last
    }

    /// Record `level`, returning it when it differs from the previous one
    pub fn update(&mut self, level: bool) -> Option<bool> {
        if level == self.last {
            return None;
        }
        self.last = level;
        Some(level)
    }
}
