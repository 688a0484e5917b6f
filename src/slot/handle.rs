use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::constants::SLOT_SAMPLES;

use super::pool::SlotPool;

/// Exclusive handle to a slot acquired for writing.
///
/// Provides `DerefMut` access to the underlying `[i16; 512]` samples.
/// Dropping the handle releases the slot's lock tag; the data stays queued
/// (occupancy was counted at acquisition).
pub struct WriteSlot<'p> {
    pool: &'p SlotPool,
    index: usize,
}

impl<'p> WriteSlot<'p> {
    /// The caller (the pool) must have claimed `index` for writing.
    pub(crate) fn new(pool: &'p SlotPool, index: usize) -> Self {
        WriteSlot { pool, index }
    }

    /// Stable identity of this slot within the pool.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Deref for WriteSlot<'_> {
    type Target = [i16; SLOT_SAMPLES];

    fn deref(&self) -> &Self::Target {
        // SAFETY: The tag admits one holder; we are it.
        unsafe { &(*self.pool.data_ptr(self.index)).samples }
    }
}

impl DerefMut for WriteSlot<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: The tag admits one holder; we are it.
        unsafe { &mut (*self.pool.data_ptr(self.index)).samples }
    }
}

impl Drop for WriteSlot<'_> {
    fn drop(&mut self) {
        self.pool.release(self.index);
    }
}

impl fmt::Debug for WriteSlot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteSlot").field("index", &self.index).finish()
    }
}

/// Handle to a slot acquired for reading.
///
/// Provides `Deref` access to the samples. Dropping the handle releases the
/// slot's lock tag, making it available to the producer again.
pub struct ReadSlot<'p> {
    pool: &'p SlotPool,
    index: usize,
}

impl<'p> ReadSlot<'p> {
    /// The caller (the pool) must have claimed `index` for reading.
    pub(crate) fn new(pool: &'p SlotPool, index: usize) -> Self {
        ReadSlot { pool, index }
    }

    /// Stable identity of this slot within the pool.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Deref for ReadSlot<'_> {
    type Target = [i16; SLOT_SAMPLES];

    fn deref(&self) -> &Self::Target {
        // SAFETY: The tag admits one holder; we are it, and the producer
        // released the slot (with its data) before we could claim it.
        unsafe { &(*self.pool.data_ptr(self.index)).samples }
    }
}

impl Drop for ReadSlot<'_> {
    fn drop(&mut self) {
        self.pool.release(self.index);
    }
}

impl fmt::Debug for ReadSlot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadSlot").field("index", &self.index).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::super::pool::{FullPolicy, LockState, PoolError, SlotPool};
    use super::WriteSlot;

    #[test]
    fn write_then_read_sees_the_data() {
        let pool = SlotPool::new(FullPolicy::Strict);
        let mut writer = pool.acquire_for_write().unwrap();
        writer[0] = 1234;
        writer[511] = -5678;
        let index = writer.index();
        drop(writer);

        let reader = pool.acquire_for_read().unwrap();
        assert_eq!(reader.index(), index);
        assert_eq!(reader[0], 1234);
        assert_eq!(reader[511], -5678);
    }

    #[test]
    fn data_survives_release_and_reacquire() {
        let pool = SlotPool::new(FullPolicy::Strict);
        let mut writer = pool.acquire_for_write().unwrap();
        writer.fill(77);
        drop(writer);
        drop(pool.acquire_for_read().unwrap());

        // Slots are cycled, never cleared: a full lap later the same slot
        // still holds its old samples until overwritten.
        for _ in 0..11 {
            drop(pool.acquire_for_write().unwrap());
            drop(pool.acquire_for_read().unwrap());
        }
        let writer = pool.acquire_for_write().unwrap();
        assert_eq!(writer.index(), 0);
        assert_eq!(writer[0], 77);
    }

    #[test]
    fn handle_results_support_unwrap_err() {
        // Both handles are Debug (by their slot index), so acquire results
        // can be unwrapped either way in assertions.
        let pool = SlotPool::new(FullPolicy::Strict);
        assert_eq!(pool.acquire_for_read().unwrap_err(), PoolError::Empty);

        let mut held: [Option<WriteSlot<'_>>; 12] = Default::default();
        for entry in held.iter_mut() {
            *entry = Some(pool.acquire_for_write().unwrap());
        }
        assert_eq!(pool.acquire_for_write().unwrap_err(), PoolError::Exhausted);
    }

    #[test]
    fn drop_frees_the_tag() {
        let pool = SlotPool::new(FullPolicy::Strict);
        {
            let writer = pool.acquire_for_write().unwrap();
            assert_eq!(pool.lock_state(writer.index()), LockState::LockedForWrite);
        }
        assert_eq!(pool.lock_state(0), LockState::Free);

        {
            let reader = pool.acquire_for_read().unwrap();
            assert_eq!(pool.lock_state(reader.index()), LockState::LockedForRead);
        }
        assert_eq!(pool.lock_state(0), LockState::Free);
    }
}
