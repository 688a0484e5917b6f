//! Playback session: stream WAV data from storage into the slot pool.
//!
//! The counterpart of the original firmware's file-cat path: parse the
//! 44-byte header, then keep the pool topped up with 1024-byte chunks of
//! sample data for the output drainer. The final short chunk is zero
//! padded to a full slot so the drainer never plays stale data.

use crate::constants::SLOT_SAMPLES;
use crate::flags::PipelineFlags;
use crate::session::{read_exact, SessionError, SessionStep};
use crate::slot::SlotPool;
use crate::storage::StorageFile;
use crate::wav::{parse_header, WavInfo, HEADER_LEN};

/// Bytes loaded from the file per slot.
const CHUNK_BYTES: usize = SLOT_SAMPLES * 2;

/// Mainline producer for a playback pipeline.
pub struct PlaybackSession<'p, F> {
    pool: &'p SlotPool,
    flags: &'p PipelineFlags,
    file: F,
    info: WavInfo,
    remaining: u32,
    done: bool,
}

impl<'p, F> PlaybackSession<'p, F>
where
    F: StorageFile,
{
    /// Open a session over `file`, validating its header.
    pub fn new(
        pool: &'p SlotPool,
        flags: &'p PipelineFlags,
        mut file: F,
    ) -> Result<Self, SessionError<F::Error>> {
        let mut header = [0u8; HEADER_LEN];
        read_exact(&mut file, &mut header)?;
        let info = parse_header(&header).map_err(SessionError::Format)?;
        let remaining = info.data_len;
        Ok(Self {
            pool,
            flags,
            file,
            info,
            remaining,
            done: false,
        })
    }

    /// Perform one cooperative unit of work.
    ///
    /// Loads at most one slot's worth of data. When the file is exhausted
    /// the session raises the stop flag so the drainer winds down once the
    /// pool runs dry.
    pub fn step(&mut self) -> Result<SessionStep, SessionError<F::Error>> {
        if self.done || self.flags.stop_requested() {
            self.done = true;
            return Ok(SessionStep::Finished);
        }
        if self.remaining == 0 {
            self.flags.request_stop();
            self.done = true;
            return Ok(SessionStep::Finished);
        }

        // Exhausted means the drainer is behind; wait for it.
        let mut slot = match self.pool.acquire_for_write() {
            Ok(slot) => slot,
            Err(_) => return Ok(SessionStep::Idle),
        };

        let want = self.remaining.min(CHUNK_BYTES as u32) as usize;
        let mut bytes = [0u8; CHUNK_BYTES];
        read_exact(&mut self.file, &mut bytes[..want])?;
        for (sample, pair) in slot.iter_mut().zip(bytes.chunks_exact(2)) {
            *sample = i16::from_le_bytes([pair[0], pair[1]]);
        }
        drop(slot);

        self.remaining -= want as u32;
        if self.remaining == 0 {
            self.flags.request_stop();
            self.done = true;
        }
        Ok(SessionStep::ChunkMoved)
    }

    /// Parsed header of the file being played.
    pub fn info(&self) -> &WavInfo {
        &self.info
    }

    /// Sample-data bytes not yet loaded into the pool.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Recover the storage file.
    pub fn into_file(self) -> F {
        self.file
    }
}
