//! Mainline orchestration between the slot pool and persistent storage.
//!
//! Sessions run in the cooperative non-interrupt context as `step()` state
//! machines: each call performs one bounded unit of work and returns. The
//! interrupt-side actors may win any race over pool cursors, so `Exhausted`
//! and `Empty` (and a read-side `LockViolation`, when the consumer catches
//! the producer's in-flight slot) are retryable idle outcomes here, never
//! errors.

use crate::slot::PoolError;
use crate::storage::StorageFile;
use crate::wav::WavError;

pub mod record;
pub mod play;

pub use play::PlaybackSession;
pub use record::RecordSession;

/// Session failure. Storage and format errors abort the current file
/// operation; a capture overflow aborts the whole recording.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError<E> {
    /// Non-retryable pool condition (not produced by the built-in sessions;
    /// reserved for callers driving the pool directly).
    Pool(PoolError),
    /// The storage collaborator failed.
    Storage(E),
    /// The capture feeder hit its terminal overflow state.
    CaptureOverflow,
    /// The file is not a playable container.
    Format(WavError),
    /// Storage ran out of data (or space) mid-operation.
    UnexpectedEof,
}

/// Outcome of one cooperative step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionStep {
    /// Nothing to do right now; call again.
    Idle,
    /// One chunk moved between the pool and storage.
    ChunkMoved,
    /// The session is complete; further steps are no-ops.
    Finished,
}

/// Write all of `buf`, looping over short writes as the original firmware
/// did for its header.
pub(crate) fn write_all<F: StorageFile>(
    file: &mut F,
    mut buf: &[u8],
) -> Result<(), SessionError<F::Error>> {
    while !buf.is_empty() {
        let n = file.write(buf).map_err(SessionError::Storage)?;
        if n == 0 {
            return Err(SessionError::UnexpectedEof);
        }
        buf = &buf[n..];
    }
    Ok(())
}

/// Fill all of `buf`, looping over short reads.
pub(crate) fn read_exact<F: StorageFile>(
    file: &mut F,
    mut buf: &mut [u8],
) -> Result<(), SessionError<F::Error>> {
    while !buf.is_empty() {
        let n = file.read(buf).map_err(SessionError::Storage)?;
        if n == 0 {
            return Err(SessionError::UnexpectedEof);
        }
        buf = &mut buf[n..];
    }
    Ok(())
}
