//! Shared pipeline status flags.
//!
//! The original firmware used process-wide `volatile` globals (`stop`,
//! `bufferOverflow`, `uDMAErrorCounter`). Here they are an explicit object
//! owned by the caller and shared by reference between the interrupt-side
//! actors and the mainline sessions.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Stop request, capture overflow flag, and DMA error counter.
///
/// The stop flag is sampled once per output tick by the drainer and once per
/// step by the sessions. The overflow flag is raised by the capture feeder
/// and polled by the record session. The error counter is fed by the DMA
/// error interrupt collaborator.
pub struct PipelineFlags {
    stop: AtomicBool,
    overflow: AtomicBool,
    dma_errors: AtomicU32,
}

impl PipelineFlags {
    pub const fn new() -> Self {
        PipelineFlags {
            stop: AtomicBool::new(false),
            overflow: AtomicBool::new(false),
            dma_errors: AtomicU32::new(0),
        }
    }

    /// Request that the active pipeline wind down.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Raised by the capture feeder on entering its terminal overflow state.
    pub fn raise_overflow(&self) {
        self.overflow.store(true, Ordering::Release);
    }

    pub fn overflow_raised(&self) -> bool {
        self.overflow.load(Ordering::Acquire)
    }

    /// Count one DMA bus error. Called from the DMA error interrupt.
    pub fn record_dma_error(&self) {
        self.dma_errors.fetch_add(1, Ordering::AcqRel);
    }

    pub fn dma_error_count(&self) -> u32 {
        self.dma_errors.load(Ordering::Acquire)
    }

    /// Clear all flags for a new session.
    pub fn reset(&self) {
        self.stop.store(false, Ordering::Release);
        self.overflow.store(false, Ordering::Release);
        self.dma_errors.store(0, Ordering::Release);
    }
}

impl Default for PipelineFlags {
    fn default() -> Self {
        PipelineFlags::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_start_clear() {
        let flags = PipelineFlags::new();
        assert!(!flags.stop_requested());
        assert!(!flags.overflow_raised());
        assert_eq!(flags.dma_error_count(), 0);
    }

    #[test]
    fn set_and_reset() {
        let flags = PipelineFlags::new();
        flags.request_stop();
        flags.raise_overflow();
        flags.record_dma_error();
        flags.record_dma_error();
        assert!(flags.stop_requested());
        assert!(flags.overflow_raised());
        assert_eq!(flags.dma_error_count(), 2);

        flags.reset();
        assert!(!flags.stop_requested());
        assert!(!flags.overflow_raised());
        assert_eq!(flags.dma_error_count(), 0);
    }
}
