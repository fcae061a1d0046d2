use log::{debug, trace};

use crate::hal::{AdcChannel, AnalogFrontEnd, Reference};
use crate::storage::SampleBuffer;

/// Lifecycle of an asynchronous conversion on one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConversionState {
    #[default]
    Idle,
    /// Converter started, waiting for the completion interrupt
    Triggered,
}

/// Start-and-return trigger for a slow channel, paired with its completion
/// handler
#[derive(Debug, Clone, Copy)]
pub struct SingleChannelTrigger {
    channel: AdcChannel,
    state: ConversionState,
}

impl SingleChannelTrigger {
    pub const fn new(channel: AdcChannel) -> Self {
        Self {
            channel,
            state: ConversionState::Idle,
        }
    }

    pub const fn channel(&self) -> AdcChannel {
        self.channel
    }

    pub const fn state(&self) -> ConversionState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == ConversionState::Triggered
    }

    /// Route the channel, select the band-gap reference and start converting.
    /// Does not wait.
    pub fn trigger<A: AnalogFrontEnd>(&mut self, adc: &mut A) {
        if self.is_pending() {
            debug!("{}: retriggered before completion", self.channel.label());
        }

        adc.select_channel(self.channel);
        adc.select_reference(Reference::TwoBandgap);
        adc.start();
        self.state = ConversionState::Triggered;
        trace!("{}: conversion started", self.channel.label());
    }

    /// Drop a pending conversion whose channel another trigger has taken
    /// over. Its completion will never arrive.
    pub fn abandon(&mut self) {
        if self.is_pending() {
            debug!("{}: conversion superseded", self.channel.label());
            self.state = ConversionState::Idle;
        }
    }

    /// Buffer the finished conversion. Returns `true` if it was stored.
    ///
    /// A completion without a pending trigger is still buffered; the
    /// converter is the authority on what finished.
    pub fn complete<A: AnalogFrontEnd, const N: usize>(
        &mut self,
        adc: &mut A,
        buffer: &mut SampleBuffer<N>,
    ) -> bool {
        if !self.is_pending() {
            debug!("{}: completion without trigger", self.channel.label());
        }
        self.state = ConversionState::Idle;

        let stored = buffer.try_append(adc.result());
        if !stored {
            trace!("{}: buffer full, sample dropped", self.channel.label());
        }
        stored
    }
}
