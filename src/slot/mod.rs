//! Fixed-capacity slot pool and RAII slot handles.
//!
//! One [`SlotPool`] instance is shared between the interrupt-side actors
//! (capture feeder, playback drainer) and the mainline sessions. Slots are
//! acquired for writing or reading, filled or drained, and released by
//! dropping the handle. There is no allocation; the twelve 512-sample slots
//! live inside the pool and cycle forever.

pub mod pool;
pub mod handle;

pub use pool::{FullPolicy, LockState, PoolError, SlotPool};
pub use handle::{ReadSlot, WriteSlot};
