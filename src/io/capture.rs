//! Double-buffered capture feeder.
//!
//! [`CaptureFeeder`] keeps the uDMA ping-pong engine supplied with pool
//! slots. Each half of the double buffer streams into its own slot; when a
//! half completes, its slot is released into the queue and a fresh one is
//! acquired and armed, all inside the transfer-complete handler.
//!
//! ```text
//! ADC FIFO ──uDMA──► half A ──► slot ─┐
//!           └─uDMA──► half B ──► slot ─┴──► SlotPool ──► RecordSession
//! ```
//!
//! There is no backpressure below the interrupt layer: if no free slot is
//! available the feeder enters its terminal [`FeederState::Overflow`] state,
//! disables capture, and raises the shared overflow flag. Recovery requires
//! external re-initialization of the whole pipeline.

use crate::constants::SLOT_SAMPLES;
use crate::control::{CaptureControl, DmaHalf};
use crate::flags::PipelineFlags;
use crate::slot::{SlotPool, WriteSlot};

/// Feeder lifecycle. `ArmedHalfA`/`ArmedHalfB` name the half whose transfer
/// completes next; both halves are armed concurrently in either state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeederState {
    Idle,
    ArmedHalfA,
    ArmedHalfB,
    /// Terminal: the pool had no free slot for a completed transfer.
    Overflow,
}

/// Drives continuous ping-pong hardware sampling into the slot pool.
pub struct CaptureFeeder<'p, C: CaptureControl> {
    pool: &'p SlotPool,
    flags: &'p PipelineFlags,
    control: C,
    slot_a: Option<WriteSlot<'p>>,
    slot_b: Option<WriteSlot<'p>>,
    state: FeederState,
}

impl<'p, C: CaptureControl> CaptureFeeder<'p, C> {
    pub fn new(pool: &'p SlotPool, flags: &'p PipelineFlags, control: C) -> Self {
        CaptureFeeder {
            pool,
            flags,
            control,
            slot_a: None,
            slot_b: None,
            state: FeederState::Idle,
        }
    }

    /// Acquire both halves' slots, enable the hardware, and begin streaming.
    ///
    /// Call on a freshly reset pool; a failure here leaves the feeder idle
    /// and the pool in need of a reset.
    pub fn start(&mut self) -> Result<(), crate::slot::PoolError> {
        let a = self.pool.acquire_for_write()?;
        let b = self.pool.acquire_for_write()?;
        self.slot_a = Some(a);
        self.slot_b = Some(b);
        self.control.enable();
        self.state = FeederState::ArmedHalfA;
        Ok(())
    }

    /// Transfer-complete message for one half of the double buffer.
    ///
    /// `samples` is the hardware buffer the completed transfer filled. The
    /// held slot for that half takes the data and is released into the
    /// queue; a replacement slot is acquired and the half re-armed. With no
    /// replacement available the feeder overflows: capture is disabled and
    /// the overflow flag raised.
    pub fn transfer_complete(&mut self, half: DmaHalf, samples: &[i16; SLOT_SAMPLES]) {
        if !matches!(
            self.state,
            FeederState::ArmedHalfA | FeederState::ArmedHalfB
        ) {
            return;
        }

        let finished = match half {
            DmaHalf::A => self.slot_a.take(),
            DmaHalf::B => self.slot_b.take(),
        };
        if let Some(mut slot) = finished {
            slot.copy_from_slice(samples);
            // Drop releases the lock tag; the data is now queued.
        }

        match self.pool.acquire_for_write() {
            Ok(next) => {
                match half {
                    DmaHalf::A => self.slot_a = Some(next),
                    DmaHalf::B => self.slot_b = Some(next),
                }
                self.control.rearm(half);
                self.state = match half {
                    DmaHalf::A => FeederState::ArmedHalfB,
                    DmaHalf::B => FeederState::ArmedHalfA,
                };
            }
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("capture overflow: no free slot for half {}", half);
                self.state = FeederState::Overflow;
                self.control.disable();
                self.flags.raise_overflow();
            }
        }
    }

    pub fn state(&self) -> FeederState {
        self.state
    }

    /// Drop any held slots and return to `Idle`. The pool itself still needs
    /// a `reset` before the next session.
    pub fn reset(&mut self) {
        self.slot_a = None;
        self.slot_b = None;
        self.state = FeederState::Idle;
    }

    /// Access the hardware collaborator (used by ISR glue and tests).
    pub fn control(&self) -> &C {
        &self.control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::POOL_SLOTS;
    use crate::slot::{FullPolicy, PoolError};

    #[derive(Default)]
    pub(crate) struct MockCapture {
        pub enabled: bool,
        pub disabled: bool,
        pub rearms_a: u32,
        pub rearms_b: u32,
    }

    impl CaptureControl for MockCapture {
        fn enable(&mut self) {
            self.enabled = true;
        }

        fn rearm(&mut self, half: DmaHalf) {
            match half {
                DmaHalf::A => self.rearms_a += 1,
                DmaHalf::B => self.rearms_b += 1,
            }
        }

        fn disable(&mut self) {
            self.disabled = true;
        }
    }

    fn buffer(value: i16) -> [i16; SLOT_SAMPLES] {
        [value; SLOT_SAMPLES]
    }

    #[test]
    fn start_arms_both_halves() {
        let pool = SlotPool::new(FullPolicy::Strict);
        let flags = PipelineFlags::new();
        let mut feeder = CaptureFeeder::new(&pool, &flags, MockCapture::default());

        feeder.start().unwrap();
        assert_eq!(feeder.state(), FeederState::ArmedHalfA);
        assert!(feeder.control().enabled);
        assert_eq!(pool.occupancy(), 2);
    }

    #[test]
    fn idle_feeder_ignores_events() {
        let pool = SlotPool::new(FullPolicy::Strict);
        let flags = PipelineFlags::new();
        let mut feeder = CaptureFeeder::new(&pool, &flags, MockCapture::default());

        feeder.transfer_complete(DmaHalf::A, &buffer(1));
        assert_eq!(feeder.state(), FeederState::Idle);
        assert_eq!(pool.occupancy(), 0);
    }

    #[test]
    fn transfer_complete_queues_data_and_rearms() {
        let pool = SlotPool::new(FullPolicy::Strict);
        let flags = PipelineFlags::new();
        let mut feeder = CaptureFeeder::new(&pool, &flags, MockCapture::default());
        feeder.start().unwrap();

        feeder.transfer_complete(DmaHalf::A, &buffer(111));
        assert_eq!(feeder.state(), FeederState::ArmedHalfB);
        assert_eq!(feeder.control().rearms_a, 1);
        assert_eq!(pool.occupancy(), 3);

        feeder.transfer_complete(DmaHalf::B, &buffer(222));
        assert_eq!(feeder.state(), FeederState::ArmedHalfA);
        assert_eq!(feeder.control().rearms_b, 1);

        // The first two completed slots carry the hardware data, in order.
        let first = pool.acquire_for_read().unwrap();
        assert_eq!(first[0], 111);
        assert_eq!(first[SLOT_SAMPLES - 1], 111);
        drop(first);
        let second = pool.acquire_for_read().unwrap();
        assert_eq!(second[0], 222);
    }

    #[test]
    fn scenario_c_overflow_without_a_consumer() {
        let pool = SlotPool::new(FullPolicy::Strict);
        let flags = PipelineFlags::new();
        let mut feeder = CaptureFeeder::new(&pool, &flags, MockCapture::default());
        feeder.start().unwrap();

        // With nobody draining, the feeder re-arms until every slot holds
        // undrained data: 2 slots at start + one per completed transfer.
        let mut half = DmaHalf::A;
        for _ in 0..POOL_SLOTS - 2 {
            feeder.transfer_complete(half, &buffer(0));
            assert_ne!(feeder.state(), FeederState::Overflow);
            half = match half {
                DmaHalf::A => DmaHalf::B,
                DmaHalf::B => DmaHalf::A,
            };
        }
        assert_eq!(pool.occupancy(), POOL_SLOTS);

        // The next completion finds no free slot: terminal overflow.
        feeder.transfer_complete(half, &buffer(0));
        assert_eq!(feeder.state(), FeederState::Overflow);
        assert!(feeder.control().disabled);
        assert!(flags.overflow_raised());

        // Further events are ignored.
        let rearms = feeder.control().rearms_a + feeder.control().rearms_b;
        feeder.transfer_complete(DmaHalf::A, &buffer(0));
        assert_eq!(feeder.state(), FeederState::Overflow);
        assert_eq!(
            feeder.control().rearms_a + feeder.control().rearms_b,
            rearms
        );
    }

    #[test]
    fn start_on_full_pool_fails() {
        let pool = SlotPool::new(FullPolicy::Strict);
        let flags = PipelineFlags::new();
        for _ in 0..POOL_SLOTS {
            drop(pool.acquire_for_write().unwrap());
        }
        let mut feeder = CaptureFeeder::new(&pool, &flags, MockCapture::default());
        assert_eq!(feeder.start().unwrap_err(), PoolError::Exhausted);
        assert_eq!(feeder.state(), FeederState::Idle);
    }

    #[test]
    fn reset_returns_to_idle() {
        let pool = SlotPool::new(FullPolicy::Strict);
        let flags = PipelineFlags::new();
        let mut feeder = CaptureFeeder::new(&pool, &flags, MockCapture::default());
        feeder.start().unwrap();
        feeder.reset();
        assert_eq!(feeder.state(), FeederState::Idle);
        // Held tags were released on reset.
        assert_eq!(pool.lock_state(0), crate::slot::LockState::Free);
        assert_eq!(pool.lock_state(1), crate::slot::LockState::Free);
    }
}
