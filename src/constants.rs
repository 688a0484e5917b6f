/// Number of 16-bit samples per pool slot.
pub const SLOT_SAMPLES: usize = 512;

/// Number of slots in the pool.
pub const POOL_SLOTS: usize = 12;

/// ADC capture rate in Hz (timer-triggered sequencer).
pub const CAPTURE_SAMPLE_RATE: u32 = 32_000;

/// Stored / playback sample rate in Hz.
pub const WAV_SAMPLE_RATE: u32 = 8_000;

/// Capture-to-storage decimation factor.
pub const DECIMATION: usize = 4;

/// Samples gathered before one filter + decimate + store pass.
pub const CAPTURE_FRAME: usize = SLOT_SAMPLES * DECIMATION;

/// Mid-scale value of the 12-bit ADC, subtracted for signed PCM storage.
pub const ADC_MIDSCALE: i16 = 2048;
