//! # tiva-audio
//!
//! A `no_std`, zero-allocation audio capture/playback pipeline for the
//! Tiva-C series (TM4C123x, Cortex-M4F) written in pure Rust. It provides
//! the slot-pool hand-off protocol used by uDMA ping-pong ADC capture and
//! timer-driven PWM DAC playback, with the peripheral programming itself
//! kept behind small trait seams.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Memory | [`slot`] | Fixed 12-slot sample pool with lock-tagged RAII handles |
//! | Traits | [`control`] / [`storage`] | Peripheral and filesystem collaborator seams |
//! | ISR side | [`io`] | Capture feeder and playback drainer state machines |
//! | Mainline | [`session`] | Record/playback orchestration between pool and storage |
//! | Format | [`wav`] | 44-byte linear-PCM container header |
//! | DSP | [`dsp`] | Q15 decimation filtering (feature-gated FIR) |
//!
//! ## Data flow
//!
//! ```text
//! ADC ──uDMA ping-pong──► CaptureFeeder ──► SlotPool ──► RecordSession ──► WAV file
//! WAV file ──► PlaybackSession ──► SlotPool ──► PlaybackDrainer ──► PWM DAC
//! ```
//!
//! Two priority domains share a [`slot::SlotPool`]: the interrupt side
//! ([`io::CaptureFeeder`], [`io::PlaybackDrainer`], driven by
//! transfer-complete and output-clock events) and the cooperative mainline
//! side ([`session`]). Per-slot lock tags use atomic compare-and-exchange,
//! so the hand-off does not depend on interrupt priority ordering. No
//! operation blocks; every handler runs to completion in bounded time.
//!
//! ## Pipeline parameters
//!
//! - **Slot size:** 512 samples ([`constants::SLOT_SAMPLES`])
//! - **Pool:** 12 slots ([`constants::POOL_SLOTS`])
//! - **Capture rate:** 32 kHz, decimated ×4 to 8 kHz for storage
//! - **Sample format:** `i16` (signed 16-bit, mono)
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `dsp` | yes | Q15 FIR decimation filter |
//! | `pwm-dac` | no | [`io::PwmDac`] adapter over `embedded-hal` PWM |
//! | `defmt` | no | `defmt` diagnostics on overflow / lock-violation paths |

#![no_std]

pub mod constants;
pub mod control;
pub mod flags;
pub mod slot;
pub mod io;
pub mod storage;
pub mod wav;
pub mod dsp;
pub mod session;
