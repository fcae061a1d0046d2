//! Append-only sample buffer with a "full" flag.
//!
//! Each analog channel owns one of these. The interrupt handler that owns the
//! channel is the only writer; the main loop reads the samples and resets the
//! buffer once it has consumed them. Once full, new samples are dropped rather
//! than overwriting unread data, which doubles as the main loop's "stop
//! sampling" signal.

use heapless::Vec;
use log::{debug, trace};

/// Bounded buffer of raw 16-bit converter results
///
/// Invariants: `len() <= N` and `is_full() == (len() == N)`. The flag is
/// derived from the length, so no consumer call can make them disagree.
#[derive(Debug, Clone)]
pub struct SampleBuffer<const N: usize> {
    samples: Vec<u16, N>,
}

impl<const N: usize> Default for SampleBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SampleBuffer<N> {
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Store `sample` unless the buffer is full.
    ///
    /// Returns `true` when the sample was kept. A full buffer is a flow-control
    /// state, not an error: the sample is discarded and `false` returned.
    pub fn try_append(&mut self, sample: u16) -> bool {
        if self.samples.push(sample).is_err() {
            return false;
        }

        trace!("sample {} stored at {}/{}", sample, self.samples.len(), N);

        if self.is_full() {
            debug!("sample buffer full ({} entries)", N);
        }
        true
    }

    /// Samples collected since the last reset, oldest first
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == N
    }

    /// Discard all samples, which also clears the full flag
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Hand the collected samples to `f`, then reset
    pub fn drain<R>(&mut self, f: impl FnOnce(&[u16]) -> R) -> R {
        let result = f(self.samples.as_slice());
        self.reset();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_to_capacity_then_drops() {
        let mut buffer = SampleBuffer::<4>::new();

        for sample in 1..=4 {
            assert!(!buffer.is_full());
            assert!(buffer.try_append(sample));
        }

        assert!(buffer.is_full());
        assert_eq!(buffer.len(), 4);
        assert!(!buffer.try_append(99), "fifth append must be refused");
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.samples(), &[1, 2, 3, 4], "full buffer must not overwrite");
    }

    #[test]
    fn test_length_counts_successful_appends() {
        let mut buffer = SampleBuffer::<8>::new();
        let mut accepted = 0;
        let mut last_len = 0;

        for sample in 0..20u16 {
            if buffer.try_append(sample) {
                accepted += 1;
            }
            assert!(buffer.len() >= last_len, "length must never decrease");
            last_len = buffer.len();
        }

        assert_eq!(accepted, 8);
        assert_eq!(buffer.len(), accepted);
    }

    #[test]
    fn test_reset_reopens_buffer() {
        let mut buffer = SampleBuffer::<2>::new();
        buffer.try_append(10);
        buffer.try_append(20);
        assert!(buffer.is_full());

        buffer.reset();

        assert!(buffer.is_empty());
        assert!(!buffer.is_full());
        assert!(buffer.try_append(30));
        assert_eq!(buffer.samples(), &[30]);
    }

    #[test]
    fn test_drain_hands_over_samples_and_resets() {
        let mut buffer = SampleBuffer::<3>::new();
        buffer.try_append(7);
        buffer.try_append(8);

        let sum: u32 = buffer.drain(|samples| samples.iter().map(|&s| s as u32).sum());

        assert_eq!(sum, 15);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_full_flag_always_matches_length() {
        let mut buffer = SampleBuffer::<3>::new();

        for round in 0..3 {
            for sample in 0..5u16 {
                buffer.try_append(sample);
                assert_eq!(
                    buffer.is_full(),
                    buffer.len() == buffer.capacity(),
                    "round {} sample {}",
                    round,
                    sample
                );
            }
            buffer.drain(|_| ());
            assert!(!buffer.is_full());
        }
    }

    #[test]
    fn test_zero_capacity_starts_full() {
        let mut buffer = SampleBuffer::<0>::new();
        assert!(buffer.is_full());
        assert!(!buffer.try_append(1));
    }
}
