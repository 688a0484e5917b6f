//! Interrupt-side pipeline actors.
//!
//! Hardware events are discrete run-to-completion messages delivered to
//! these state machines by the ISR glue (or a test scheduler):
//!
//! | Actor | Message | Source |
//! |-------|---------|--------|
//! | [`CaptureFeeder`] | `transfer_complete(half, samples)` | uDMA ping/pong completion |
//! | [`PlaybackDrainer`] | `tick()` | output-clock timer |
//!
//! Both actors share a [`crate::slot::SlotPool`] with the mainline sessions
//! and never block: a handler either makes progress or records a terminal
//! condition and returns.

pub mod capture;
pub mod playback;

#[cfg(feature = "pwm-dac")]
pub mod pwm_dac;

pub use capture::{CaptureFeeder, FeederState};
pub use playback::{DrainerState, PlaybackDrainer};

#[cfg(feature = "pwm-dac")]
pub use pwm_dac::PwmDac;
