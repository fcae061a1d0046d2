use log::{error, trace};

use crate::core_state::CoreError;
use crate::hal::{AdcChannel, AnalogFrontEnd, Reference};
use crate::storage::SampleBuffer;

/// Samples taken by one fast tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisTickReport {
    /// X-axis sample stored this tick, `None` when the x buffer was full
    pub x: Option<u16>,
    /// Y-axis sample stored this tick, `None` when the y buffer was full
    pub y: Option<u16>,
}

/// Dual-axis accelerometer sampler run from the 10 ms tick
///
/// Converts x then y back to back, busy-waiting on each conversion. The wait
/// is capped at `max_polls`; running past it means the converter is wedged,
/// and the tick returns [`CoreError::ConversionTimeout`].
#[derive(Debug, Clone, Copy)]
pub struct AxisSampler {
    max_polls: u32,
}

impl AxisSampler {
    pub const fn new(max_polls: u32) -> Self {
        Self { max_polls }
    }

    /// Sample whichever axes still have room.
    ///
    /// A full buffer skips its axis for this tick; when both are full the
    /// converter is not touched at all. The high-accuracy reference is held
    /// only for the duration of the call and restored even on timeout.
    pub fn on_fast_tick<A, const X: usize, const Y: usize>(
        &self,
        adc: &mut A,
        x: &mut SampleBuffer<X>,
        y: &mut SampleBuffer<Y>,
    ) -> Result<AxisTickReport, CoreError>
    where
        A: AnalogFrontEnd,
    {
        if x.is_full() && y.is_full() {
            trace!("fast tick: both axis buffers full");
            return Ok(AxisTickReport::default());
        }

        adc.select_reference(Reference::Avdd);
        let result = self.sample_axes(adc, x, y);
        adc.select_reference(Reference::TwoBandgap);
        result
    }

    fn sample_axes<A, const X: usize, const Y: usize>(
        &self,
        adc: &mut A,
        x: &mut SampleBuffer<X>,
        y: &mut SampleBuffer<Y>,
    ) -> Result<AxisTickReport, CoreError>
    where
        A: AnalogFrontEnd,
    {
        let mut report = AxisTickReport::default();

        if !x.is_full() {
            let sample = self.convert_blocking(adc, AdcChannel::XAxis)?;
            report.x = x.try_append(sample).then_some(sample);
        }

        if !y.is_full() {
            let sample = self.convert_blocking(adc, AdcChannel::YAxis)?;
            report.y = y.try_append(sample).then_some(sample);
        }

        Ok(report)
    }

    fn convert_blocking<A: AnalogFrontEnd>(
        &self,
        adc: &mut A,
        channel: AdcChannel,
    ) -> Result<u16, CoreError> {
        adc.select_channel(channel);
        adc.start();

        let mut polls = 0;
        while !adc.is_conversion_complete() {
            polls += 1;
            if polls >= self.max_polls {
                adc.stop();
                error!("{} conversion stuck after {} polls", channel.label(), polls);
                return Err(CoreError::ConversionTimeout { channel, polls });
            }
        }

        adc.stop();
        Ok(adc.result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{AdcOp, MockAdc};

    const SAMPLER: AxisSampler = AxisSampler::new(1_000);

    #[test]
    fn test_x_then_y_with_reference_restored() {
        let mut adc = MockAdc::new(3);
        let mut x = SampleBuffer::<4>::new();
        let mut y = SampleBuffer::<4>::new();

        let report = SAMPLER.on_fast_tick(&mut adc, &mut x, &mut y).unwrap();

        assert_eq!(report.x, Some(x.samples()[0]));
        assert_eq!(report.y, Some(y.samples()[0]));
        assert_eq!(
            adc.ops(),
            &[
                AdcOp::Reference(Reference::Avdd),
                AdcOp::Channel(AdcChannel::XAxis),
                AdcOp::Start,
                AdcOp::Stop,
                AdcOp::Read,
                AdcOp::Channel(AdcChannel::YAxis),
                AdcOp::Start,
                AdcOp::Stop,
                AdcOp::Read,
                AdcOp::Reference(Reference::TwoBandgap),
            ]
        );
        assert_eq!(adc.reference(), Reference::TwoBandgap);
    }

    #[test]
    fn test_four_ticks_fill_x_then_fifth_skips_it() {
        let mut adc = MockAdc::new(0);
        let mut x = SampleBuffer::<4>::new();
        let mut y = SampleBuffer::<8>::new();

        for tick in 1..=4 {
            SAMPLER.on_fast_tick(&mut adc, &mut x, &mut y).unwrap();
            assert_eq!(x.len(), tick);
        }
        assert!(x.is_full());

        adc.clear_ops();
        let report = SAMPLER.on_fast_tick(&mut adc, &mut x, &mut y).unwrap();

        assert_eq!(report.x, None);
        assert_eq!(x.len(), 4);
        assert_eq!(y.len(), 5, "y keeps sampling");
        assert_eq!(adc.conversions_on(AdcChannel::XAxis), 0);
        assert_eq!(adc.conversions_on(AdcChannel::YAxis), 1);
    }

    #[test]
    fn test_report_matches_stored_samples() {
        let mut adc = MockAdc::new(0);
        let mut x = SampleBuffer::<2>::new();
        let mut y = SampleBuffer::<3>::new();

        for _ in 0..4 {
            let before = (x.len(), y.len());
            let report = SAMPLER.on_fast_tick(&mut adc, &mut x, &mut y).unwrap();

            assert_eq!(report.x.is_some(), x.len() > before.0);
            assert_eq!(report.y.is_some(), y.len() > before.1);
            if let Some(sample) = report.x {
                assert_eq!(x.samples().last(), Some(&sample));
            }
            if let Some(sample) = report.y {
                assert_eq!(y.samples().last(), Some(&sample));
            }
        }
        assert_eq!((x.len(), y.len()), (2, 3));
    }

    #[test]
    fn test_only_y_grows_when_x_full() {
        let mut adc = MockAdc::new(1);
        let mut x = SampleBuffer::<1>::new();
        let mut y = SampleBuffer::<4>::new();
        x.try_append(0);

        SAMPLER.on_fast_tick(&mut adc, &mut x, &mut y).unwrap();

        assert_eq!(x.len(), 1);
        assert_eq!(y.len(), 1);
    }

    #[test]
    fn test_both_full_touches_nothing() {
        let mut adc = MockAdc::new(1);
        let mut x = SampleBuffer::<1>::new();
        let mut y = SampleBuffer::<1>::new();
        x.try_append(0);
        y.try_append(0);

        let report = SAMPLER.on_fast_tick(&mut adc, &mut x, &mut y).unwrap();

        assert_eq!(report, AxisTickReport::default());
        assert!(adc.ops().is_empty(), "no conversion and no reference switch");
    }

    #[test]
    fn test_stuck_conversion_times_out_and_restores() {
        let mut adc = MockAdc::stuck();
        let mut x = SampleBuffer::<4>::new();
        let mut y = SampleBuffer::<4>::new();

        let result = AxisSampler::new(50).on_fast_tick(&mut adc, &mut x, &mut y);

        assert!(matches!(
            result,
            Err(CoreError::ConversionTimeout {
                channel: AdcChannel::XAxis,
                polls: 50
            })
        ));
        assert!(x.is_empty());
        assert!(y.is_empty(), "y is not attempted after x fails");
        assert_eq!(adc.reference(), Reference::TwoBandgap);
        assert!(!adc.is_running());
    }
}
