//! Trait seams for the peripheral collaborators.
//!
//! Register programming for the ADC sequencer, uDMA channel, sampling and
//! output timers, and the PWM generator lives outside this crate. The
//! pipeline drives that hardware through these traits; tests substitute
//! recording mocks.

/// One half of the uDMA ping-pong double buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaHalf {
    /// Primary (ping) transfer descriptor.
    A,
    /// Alternate (pong) transfer descriptor.
    B,
}

/// Capture-side hardware: timer-triggered ADC feeding a ping-pong uDMA
/// channel. All operations are register writes and cannot fail.
pub trait CaptureControl {
    /// Start the capture clock and enable the DMA channel.
    fn enable(&mut self);

    /// Program the next transfer for the given half. Called after every
    /// successful slot hand-off.
    fn rearm(&mut self, half: DmaHalf);

    /// Stop the capture clock. In-flight transfers are not aborted, only
    /// never re-armed.
    fn disable(&mut self);
}

/// Playback-side hardware: a fixed-rate output clock driving a DAC (PWM
/// duty register on the original board).
pub trait OutputControl {
    /// Start the output clock.
    fn enable(&mut self);

    /// Latch one sample into the output device.
    fn emit(&mut self, sample: i16);

    /// Stop the output clock.
    fn disable(&mut self);
}
