//! Fixed-rate playback drainer.
//!
//! [`PlaybackDrainer`] consumes queued slots one sample per output-clock
//! tick. When its current slot is exhausted it releases it and pulls the
//! next from the pool. An empty pool is not an error; output simply stays
//! silent until the mainline side queues more data or requests a stop.
//!
//! ```text
//! PlaybackSession ──► SlotPool ──► current slot ──tick──► DAC duty register
//! ```

use crate::constants::SLOT_SAMPLES;
use crate::control::OutputControl;
use crate::flags::PipelineFlags;
use crate::slot::{ReadSlot, SlotPool};

/// Drainer lifecycle. `Stopped` is terminal until [`PlaybackDrainer::reset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrainerState {
    Idle,
    Streaming,
    Stopped,
}

/// Drains queued slots through a one-sample-per-tick output device.
pub struct PlaybackDrainer<'p, C: OutputControl> {
    pool: &'p SlotPool,
    flags: &'p PipelineFlags,
    control: C,
    current: Option<ReadSlot<'p>>,
    cursor: usize,
    state: DrainerState,
}

impl<'p, C: OutputControl> PlaybackDrainer<'p, C> {
    pub fn new(pool: &'p SlotPool, flags: &'p PipelineFlags, control: C) -> Self {
        PlaybackDrainer {
            pool,
            flags,
            control,
            current: None,
            cursor: 0,
            state: DrainerState::Idle,
        }
    }

    /// Grab the first queued slot (if any), enable the output clock, and
    /// begin streaming. The mainline side preloads the pool beforehand.
    pub fn start(&mut self) {
        self.current = self.pool.acquire_for_read().ok();
        self.cursor = 0;
        self.control.enable();
        self.state = DrainerState::Streaming;
    }

    /// Output-clock tick message.
    ///
    /// Emits the sample at the cursor and advances. On slot exhaustion the
    /// slot is released and the next acquired; if none is queued, a pending
    /// stop request shuts the output down, otherwise the drainer stays
    /// streaming slot-less and retries on the next tick.
    pub fn tick(&mut self) {
        if self.state != DrainerState::Streaming {
            return;
        }

        match self.current {
            Some(ref slot) => {
                self.control.emit(slot[self.cursor]);
                self.cursor += 1;
                if self.cursor == SLOT_SAMPLES {
                    self.current = None; // release before reacquiring
                    self.cursor = 0;
                    match self.pool.acquire_for_read() {
                        Ok(next) => self.current = Some(next),
                        Err(_) => {
                            if self.flags.stop_requested() {
                                self.control.disable();
                                self.state = DrainerState::Stopped;
                            }
                        }
                    }
                }
            }
            None => {
                if self.flags.stop_requested() {
                    self.control.disable();
                    self.state = DrainerState::Stopped;
                    return;
                }
                // Silent tick: retry the acquire, raise nothing.
                if let Ok(slot) = self.pool.acquire_for_read() {
                    self.current = Some(slot);
                    self.cursor = 0;
                }
            }
        }
    }

    pub fn state(&self) -> DrainerState {
        self.state
    }

    /// Whether a slot is currently being drained.
    pub fn holds_slot(&self) -> bool {
        self.current.is_some()
    }

    /// Drop any held slot and return to `Idle`.
    pub fn reset(&mut self) {
        self.current = None;
        self.cursor = 0;
        self.state = DrainerState::Idle;
    }

    /// Access the hardware collaborator (used by ISR glue and tests).
    pub fn control(&self) -> &C {
        &self.control
    }
}
