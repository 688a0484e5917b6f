//! Capture-path decimation filtering, Q15 fixed-point.
//!
//! The record session samples at 32 kHz and stores at 8 kHz; every frame of
//! 2048 captured samples shrinks to 512. The kernel sits behind
//! [`DecimationFilter`] so a platform FIR (CMSIS-style) can be substituted;
//! [`Decimator`] is the bare pick-every-Nth form and [`FirDecimator`]
//! (feature `dsp`) adds a 31-tap windowed-sinc anti-alias low-pass.

use crate::constants::{CAPTURE_FRAME, DECIMATION, SLOT_SAMPLES};

/// Saturate an `i32` to the `i16` range.
#[inline(always)]
pub fn saturate16(value: i32) -> i16 {
    if value > i16::MAX as i32 {
        i16::MAX
    } else if value < i16::MIN as i32 {
        i16::MIN
    } else {
        value as i16
    }
}

/// Reduces one captured frame to one stored chunk.
pub trait DecimationFilter {
    /// Consume 2048 input samples, produce 512 output samples. Stateful
    /// implementations carry history across frames.
    fn process(&mut self, input: &[i16; CAPTURE_FRAME], output: &mut [i16; SLOT_SAMPLES]);
}

/// Plain decimator: keeps every `DECIMATION`-th sample, no filtering.
#[derive(Default)]
pub struct Decimator;

impl DecimationFilter for Decimator {
    fn process(&mut self, input: &[i16; CAPTURE_FRAME], output: &mut [i16; SLOT_SAMPLES]) {
        for (k, out) in output.iter_mut().enumerate() {
            *out = input[k * DECIMATION];
        }
    }
}

/// Number of FIR taps.
#[cfg(feature = "dsp")]
pub const FIR_TAPS: usize = 31;

/// Hamming-windowed sinc low-pass, cutoff at an eighth of the capture rate
/// (4 kHz at 32 kHz), Q15, normalized to unity DC gain.
#[cfg(feature = "dsp")]
const FIR_COEFFS: [i16; FIR_TAPS] = [
    -39, -67, -68, 0, 156, 324, 327, 0, -621, -1189, -1139, 0, 2249, 5022, 7322, 8213, 7322, 5022,
    2249, 0, -1139, -1189, -621, 0, 327, 324, 156, 0, -68, -67, -39,
];

/// Anti-aliased ×4 decimator: low-pass FIR, then keep every 4th output.
#[cfg(feature = "dsp")]
pub struct FirDecimator {
    /// Tail of the previous frame, so filtering is continuous across frames.
    history: [i16; FIR_TAPS - 1],
}

#[cfg(feature = "dsp")]
impl FirDecimator {
    pub const fn new() -> Self {
        FirDecimator {
            history: [0; FIR_TAPS - 1],
        }
    }
}

#[cfg(feature = "dsp")]
impl Default for FirDecimator {
    fn default() -> Self {
        FirDecimator::new()
    }
}

#[cfg(feature = "dsp")]
impl DecimationFilter for FirDecimator {
    fn process(&mut self, input: &[i16; CAPTURE_FRAME], output: &mut [i16; SLOT_SAMPLES]) {
        // Virtual stream: history followed by the new frame.
        let sample_at = |index: usize| -> i32 {
            if index < FIR_TAPS - 1 {
                self.history[index] as i32
            } else {
                input[index - (FIR_TAPS - 1)] as i32
            }
        };

        for (k, out) in output.iter_mut().enumerate() {
            let newest = k * DECIMATION + FIR_TAPS - 1;
            let mut acc: i32 = 0;
            for (j, &coeff) in FIR_COEFFS.iter().enumerate() {
                acc += coeff as i32 * sample_at(newest - j);
            }
            *out = saturate16(acc >> 15);
        }

        self.history
            .copy_from_slice(&input[CAPTURE_FRAME - (FIR_TAPS - 1)..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturate_clamps_both_ends() {
        assert_eq!(saturate16(40_000), i16::MAX);
        assert_eq!(saturate16(-40_000), i16::MIN);
        assert_eq!(saturate16(-5), -5);
    }

    #[test]
    fn decimator_keeps_every_fourth_sample() {
        let mut input = [0i16; CAPTURE_FRAME];
        for (i, sample) in input.iter_mut().enumerate() {
            *sample = i as i16;
        }
        let mut output = [0i16; SLOT_SAMPLES];
        Decimator.process(&input, &mut output);
        assert_eq!(output[0], 0);
        assert_eq!(output[1], 4);
        assert_eq!(output[511], 2044);
    }

    #[cfg(feature = "dsp")]
    #[test]
    fn fir_coefficients_have_unity_dc_gain() {
        let sum: i32 = FIR_COEFFS.iter().map(|&c| c as i32).sum();
        assert_eq!(sum, 32767);
    }

    #[cfg(feature = "dsp")]
    #[test]
    fn fir_passes_dc_after_warmup() {
        let input = [1000i16; CAPTURE_FRAME];
        let mut output = [0i16; SLOT_SAMPLES];
        let mut filter = FirDecimator::new();
        filter.process(&input, &mut output);

        // The first few outputs still see the zeroed history; past the tap
        // span the response settles at the input level (±1 for rounding).
        for &sample in &output[FIR_TAPS / DECIMATION + 1..] {
            assert!((999..=1000).contains(&sample), "got {sample}");
        }

        // A second frame is fully warmed up from the first sample.
        filter.process(&input, &mut output);
        for &sample in output.iter() {
            assert!((999..=1000).contains(&sample), "got {sample}");
        }
    }

    #[cfg(feature = "dsp")]
    #[test]
    fn fir_attenuates_nyquist_tone() {
        // Alternating +/- full scale is the 16 kHz tone at a 32 kHz rate;
        // the 4 kHz low-pass must crush it.
        let mut input = [0i16; CAPTURE_FRAME];
        for (i, sample) in input.iter_mut().enumerate() {
            *sample = if i % 2 == 0 { 8000 } else { -8000 };
        }
        let mut output = [0i16; SLOT_SAMPLES];
        let mut filter = FirDecimator::new();
        filter.process(&input, &mut output);
        filter.process(&input.clone(), &mut output);

        for &sample in output.iter() {
            assert!(sample.unsigned_abs() < 80, "got {sample}");
        }
    }
}
