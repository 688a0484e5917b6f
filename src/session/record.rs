//! Recording session: drain captured slots, decimate, append WAV data.
//!
//! Mirrors the capture mainline of the original firmware: gather four
//! pool slots into one capture frame, remove the ADC mid-scale bias,
//! low-pass and decimate 4:1, then append the resulting 1024-byte chunk
//! to the file. The header is written up front with zeroed sizes and
//! back-patched when the session finishes.

use crate::constants::{ADC_MIDSCALE, CAPTURE_FRAME, SLOT_SAMPLES, WAV_SAMPLE_RATE};
use crate::dsp::DecimationFilter;
use crate::flags::PipelineFlags;
use crate::session::{write_all, SessionError, SessionStep};
use crate::slot::SlotPool;
use crate::storage::StorageFile;
use crate::wav::{header_template, patch_sizes};

/// Slots gathered per capture frame.
const SLOTS_PER_FRAME: usize = CAPTURE_FRAME / SLOT_SAMPLES;

/// Bytes appended to the file per processed frame.
const CHUNK_BYTES: usize = SLOT_SAMPLES * 2;

/// Mainline consumer for a capture pipeline.
pub struct RecordSession<'p, F, D> {
    pool: &'p SlotPool,
    flags: &'p PipelineFlags,
    file: F,
    filter: D,
    frame: [i16; CAPTURE_FRAME],
    gathered: usize,
    chunks_written: u32,
    finished: bool,
}

impl<'p, F, D> RecordSession<'p, F, D>
where
    F: StorageFile,
    D: DecimationFilter,
{
    /// Begin a recording into `file`, writing the placeholder header.
    pub fn new(
        pool: &'p SlotPool,
        flags: &'p PipelineFlags,
        mut file: F,
        filter: D,
    ) -> Result<Self, SessionError<F::Error>> {
        let header = header_template(WAV_SAMPLE_RATE);
        write_all(&mut file, &header)?;
        Ok(Self {
            pool,
            flags,
            file,
            filter,
            frame: [0; CAPTURE_FRAME],
            gathered: 0,
            chunks_written: 0,
            finished: false,
        })
    }

    /// Perform one cooperative unit of work.
    ///
    /// Moves at most one slot out of the pool. Every fourth slot completes
    /// a frame and flushes a decimated chunk to storage. A raised overflow
    /// flag finalizes the file (best effort) and aborts; a stop request
    /// finalizes and finishes cleanly.
    pub fn step(&mut self) -> Result<SessionStep, SessionError<F::Error>> {
        if self.finished {
            return Ok(SessionStep::Finished);
        }
        if self.flags.overflow_raised() {
            self.finished = true;
            let _ = self.finalize();
            return Err(SessionError::CaptureOverflow);
        }
        if self.flags.stop_requested() {
            self.finished = true;
            self.finalize()?;
            return Ok(SessionStep::Finished);
        }

        // Empty and LockViolation both mean the feeder is still working on
        // the next slot. Try again later.
        let slot = match self.pool.acquire_for_read() {
            Ok(slot) => slot,
            Err(_) => return Ok(SessionStep::Idle),
        };
        let base = self.gathered * SLOT_SAMPLES;
        for (dst, &raw) in self.frame[base..base + SLOT_SAMPLES].iter_mut().zip(slot.iter()) {
            *dst = raw.wrapping_sub(ADC_MIDSCALE);
        }
        drop(slot);
        self.gathered += 1;
        if self.gathered < SLOTS_PER_FRAME {
            return Ok(SessionStep::Idle);
        }
        self.gathered = 0;

        let mut out = [0i16; SLOT_SAMPLES];
        self.filter.process(&self.frame, &mut out);
        let mut bytes = [0u8; CHUNK_BYTES];
        for (pair, sample) in bytes.chunks_exact_mut(2).zip(out.iter()) {
            pair.copy_from_slice(&sample.to_le_bytes());
        }
        write_all(&mut self.file, &bytes)?;
        self.chunks_written += 1;
        Ok(SessionStep::ChunkMoved)
    }

    /// Chunks flushed so far.
    pub fn chunks_written(&self) -> u32 {
        self.chunks_written
    }

    /// Recover the storage file, e.g. to close it.
    pub fn into_file(self) -> F {
        self.file
    }

    fn finalize(&mut self) -> Result<(), SessionError<F::Error>> {
        let data_len = self.chunks_written * CHUNK_BYTES as u32;
        let mut header = header_template(WAV_SAMPLE_RATE);
        patch_sizes(&mut header, data_len);
        self.file.seek(0).map_err(SessionError::Storage)?;
        write_all(&mut self.file, &header)?;
        Ok(())
    }
}
