use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::constants::{POOL_SLOTS, SLOT_SAMPLES};

use super::handle::{ReadSlot, WriteSlot};

/// Raw slot storage: 512 signed 16-bit samples, 4-byte aligned.
#[repr(C, align(4))]
pub struct SlotData {
    pub samples: [i16; SLOT_SAMPLES],
}

impl SlotData {
    const ZEROED: SlotData = SlotData {
        samples: [0i16; SLOT_SAMPLES],
    };
}

/// Per-slot lock tag guarding against concurrent acquisition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LockState {
    /// Not held by either side.
    Free = 0,
    /// Held by the producer side.
    LockedForWrite = 1,
    /// Held by the consumer side.
    LockedForRead = 2,
}

impl LockState {
    fn from_tag(tag: u8) -> LockState {
        match tag {
            1 => LockState::LockedForWrite,
            2 => LockState::LockedForRead,
            _ => LockState::Free,
        }
    }
}

/// Errors reported by the pool. The pool itself never retries; retry policy
/// belongs to the caller (see the session module).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PoolError {
    /// No free slot: the pool is at capacity per the configured [`FullPolicy`].
    Exhausted,
    /// No queued data: occupancy is zero.
    Empty,
    /// The slot at the cursor was expected Free but was not. On the write
    /// path this indicates a hand-off defect; on the read path it means the
    /// consumer caught up to a slot the producer still holds.
    LockViolation,
}

/// Which full-check formula `acquire_for_write` uses.
///
/// The original firmware summed the occupancy counter and the count of
/// non-Free slots, double-counting slots that are both acquired and still
/// locked by the producer. During steady double-buffered capture two slots
/// are always in that state, so `Legacy` exhausts two transfers early.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FullPolicy {
    /// Full when `occupancy + count(tag != Free) >= POOL_SLOTS`.
    Legacy,
    /// Full when `occupancy >= POOL_SLOTS`.
    Strict,
}

/// Fixed-capacity ring of lock-tagged sample slots.
///
/// One producer role and one consumer role may be active at a time. The
/// write cursor holds the index last handed to the producer (advanced, then
/// used); the read cursor holds the next index for the consumer (used, then
/// advanced). The occupancy counter tracks produced-but-undrained slots and
/// moves only inside the acquire operations.
///
/// Lock tags are claimed with atomic compare-and-exchange, so the
/// check-then-set hand-off does not rely on one side preempting the other.
pub struct SlotPool {
    /// Per-slot lock tags (`LockState` as `u8`).
    tags: [AtomicU8; POOL_SLOTS],
    /// Index last handed to the producer. Producer-side only.
    write_cursor: AtomicUsize,
    /// Next index to hand to the consumer. Consumer-side only.
    read_cursor: AtomicUsize,
    /// Count of produced-but-undrained slots.
    occupancy: AtomicUsize,
    full_policy: FullPolicy,
    /// Slot storage. Accessed only through a held handle's index.
    storage: UnsafeCell<[SlotData; POOL_SLOTS]>,
}

// SAFETY: All shared bookkeeping is atomic. The storage behind UnsafeCell is
// only reached through WriteSlot/ReadSlot handles, and a slot's tag admits
// exactly one holder between its compare-exchange claim and its release.
unsafe impl Sync for SlotPool {}

/// Single-step index advance with wrap. The original helper mapped any index
/// `>= POOL_SLOTS` to 0; it is only valid for one-position moves.
fn advance(index: usize) -> usize {
    if index + 1 >= POOL_SLOTS {
        0
    } else {
        index + 1
    }
}

impl SlotPool {
    /// Create an empty pool with the given full-check policy.
    #[allow(clippy::declare_interior_mut_const)]
    pub const fn new(full_policy: FullPolicy) -> Self {
        const FREE_TAG: AtomicU8 = AtomicU8::new(LockState::Free as u8);
        SlotPool {
            tags: [FREE_TAG; POOL_SLOTS],
            // First advance wraps to slot 0.
            write_cursor: AtomicUsize::new(POOL_SLOTS - 1),
            read_cursor: AtomicUsize::new(0),
            occupancy: AtomicUsize::new(0),
            full_policy,
            storage: UnsafeCell::new([SlotData::ZEROED; POOL_SLOTS]),
        }
    }

    /// Acquire the next slot for writing.
    ///
    /// Fails with [`PoolError::Exhausted`] when the pool is full per the
    /// configured [`FullPolicy`]. Otherwise the occupancy counter is
    /// incremented and the write cursor advanced before the slot's tag is
    /// claimed; a claim failure reports [`PoolError::LockViolation`] and, as
    /// in the original firmware, leaves the counter and cursor advanced.
    pub fn acquire_for_write(&self) -> Result<WriteSlot<'_>, PoolError> {
        if self.is_full() {
            return Err(PoolError::Exhausted);
        }

        self.occupancy.fetch_add(1, Ordering::AcqRel);

        // Only the producer side touches the write cursor.
        let index = advance(self.write_cursor.load(Ordering::Relaxed));
        self.write_cursor.store(index, Ordering::Relaxed);

        match self.tags[index].compare_exchange(
            LockState::Free as u8,
            LockState::LockedForWrite as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => Ok(WriteSlot::new(self, index)),
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("write acquire: slot {} not free", index);
                Err(PoolError::LockViolation)
            }
        }
    }

    /// Acquire the oldest queued slot for reading.
    ///
    /// Fails with [`PoolError::Empty`] when occupancy is zero, leaving all
    /// cursors and the counter untouched. Otherwise occupancy is decremented
    /// and the tag at the read cursor claimed; a claim failure reports
    /// [`PoolError::LockViolation`] with the cursor left in place (the
    /// decrement is kept, matching the original firmware). On success the read cursor
    /// advances past the returned slot.
    pub fn acquire_for_read(&self) -> Result<ReadSlot<'_>, PoolError> {
        if self.occupancy.load(Ordering::Acquire) == 0 {
            return Err(PoolError::Empty);
        }

        self.occupancy.fetch_sub(1, Ordering::AcqRel);

        let index = self.read_cursor.load(Ordering::Relaxed);
        match self.tags[index].compare_exchange(
            LockState::Free as u8,
            LockState::LockedForRead as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                self.read_cursor.store(advance(index), Ordering::Relaxed);
                Ok(ReadSlot::new(self, index))
            }
            Err(_) => Err(PoolError::LockViolation),
        }
    }

    /// Set a slot's tag back to Free. Idempotent. Invoked once per hold by
    /// the handle's `Drop`.
    pub(crate) fn release(&self, index: usize) {
        self.tags[index].store(LockState::Free as u8, Ordering::Release);
    }

    /// Current lock tag of a slot.
    pub fn lock_state(&self, index: usize) -> LockState {
        LockState::from_tag(self.tags[index].load(Ordering::Acquire))
    }

    /// Number of produced-but-undrained slots.
    pub fn occupancy(&self) -> usize {
        self.occupancy.load(Ordering::Acquire)
    }

    /// Total number of slots.
    pub const fn capacity(&self) -> usize {
        POOL_SLOTS
    }

    /// True iff occupancy is zero.
    pub fn is_empty(&self) -> bool {
        self.occupancy() == 0
    }

    /// True iff `acquire_for_write` would fail with `Exhausted`.
    pub fn is_full(&self) -> bool {
        let occupancy = self.occupancy.load(Ordering::Acquire);
        match self.full_policy {
            FullPolicy::Strict => occupancy >= POOL_SLOTS,
            FullPolicy::Legacy => {
                let busy = self
                    .tags
                    .iter()
                    .filter(|tag| tag.load(Ordering::Acquire) != LockState::Free as u8)
                    .count();
                occupancy + busy >= POOL_SLOTS
            }
        }
    }

    /// Re-initialize the pool for a new session.
    ///
    /// Taking `&mut self` proves no handles are outstanding: every handle
    /// borrows the pool.
    pub fn reset(&mut self) {
        for tag in &mut self.tags {
            *tag.get_mut() = LockState::Free as u8;
        }
        *self.write_cursor.get_mut() = POOL_SLOTS - 1;
        *self.read_cursor.get_mut() = 0;
        *self.occupancy.get_mut() = 0;
    }

    /// Pointer to a slot's storage.
    ///
    /// # Safety
    /// Caller must hold the slot (its tag claimed via an acquire operation).
    pub(crate) unsafe fn data_ptr(&self, index: usize) -> *mut SlotData {
        let storage = self.storage.get();
        unsafe { (*storage).as_mut_ptr().add(index) }
    }
}
