//! Linear-PCM container header (canonical 44-byte RIFF/WAVE layout).
//!
//! Recordings are mono 16-bit PCM. The chunk-size and data-size fields are
//! written as zero placeholders and back-patched once the total sample
//! count is known, exactly as the original firmware did.

/// Size of the canonical header: RIFF chunk + `fmt ` subchunk + `data` tag.
pub const HEADER_LEN: usize = 44;

/// Byte offset of the RIFF chunk-size field.
const CHUNK_SIZE_OFFSET: usize = 4;
/// Byte offset of the `data` subchunk-size field.
const DATA_SIZE_OFFSET: usize = 40;

/// Header parse failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WavError {
    /// Missing `RIFF`/`WAVE`/`fmt `/`data` magic.
    BadMagic,
    /// Not the mono 16-bit PCM layout this pipeline produces and plays.
    Unsupported,
}

/// Parsed header fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// Payload length in bytes.
    pub data_len: u32,
}

fn put_u32(header: &mut [u8; HEADER_LEN], offset: usize, value: u32) {
    header[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u16(header: &mut [u8; HEADER_LEN], offset: usize, value: u16) {
    header[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn get_u32(header: &[u8; HEADER_LEN], offset: usize) -> u32 {
    u32::from_le_bytes([
        header[offset],
        header[offset + 1],
        header[offset + 2],
        header[offset + 3],
    ])
}

fn get_u16(header: &[u8; HEADER_LEN], offset: usize) -> u16 {
    u16::from_le_bytes([header[offset], header[offset + 1]])
}

/// Build a mono 16-bit PCM header with zeroed size fields.
pub fn header_template(sample_rate: u32) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0..4].copy_from_slice(b"RIFF");
    // Chunk size patched later.
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    put_u32(&mut header, 16, 16); // fmt subchunk size
    put_u16(&mut header, 20, 1); // PCM
    put_u16(&mut header, 22, 1); // mono
    put_u32(&mut header, 24, sample_rate);
    put_u32(&mut header, 28, sample_rate * 2); // byte rate
    put_u16(&mut header, 32, 2); // block align
    put_u16(&mut header, 34, 16); // bits per sample
    header[36..40].copy_from_slice(b"data");
    // Data size patched later.
    header
}

/// Back-patch the chunk-size and data-size fields for `data_len` payload
/// bytes.
pub fn patch_sizes(header: &mut [u8; HEADER_LEN], data_len: u32) {
    put_u32(header, CHUNK_SIZE_OFFSET, data_len + 36);
    put_u32(header, DATA_SIZE_OFFSET, data_len);
}

/// Parse and validate a canonical header.
pub fn parse_header(header: &[u8; HEADER_LEN]) -> Result<WavInfo, WavError> {
    if &header[0..4] != b"RIFF"
        || &header[8..12] != b"WAVE"
        || &header[12..16] != b"fmt "
        || &header[36..40] != b"data"
    {
        return Err(WavError::BadMagic);
    }

    let format_tag = get_u16(header, 20);
    let channels = get_u16(header, 22);
    let bits_per_sample = get_u16(header, 34);
    if format_tag != 1 || channels != 1 || bits_per_sample != 16 {
        return Err(WavError::Unsupported);
    }

    Ok(WavInfo {
        sample_rate: get_u32(header, 24),
        channels,
        bits_per_sample,
        data_len: get_u32(header, DATA_SIZE_OFFSET),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAV_SAMPLE_RATE;

    #[test]
    fn template_matches_reference_bytes() {
        // The original firmware's 8 kHz header table, sizes zeroed.
        let header = header_template(WAV_SAMPLE_RATE);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(header[16..24], [0x10, 0, 0, 0, 0x01, 0, 0x01, 0]);
        assert_eq!(header[24..28], [0x40, 0x1f, 0, 0]); // 8000
        assert_eq!(header[28..32], [0x80, 0x3e, 0, 0]); // 16000
        assert_eq!(header[32..36], [0x02, 0, 0x10, 0]);
        assert_eq!(&header[36..40], b"data");
        assert_eq!(header[40..44], [0, 0, 0, 0]);
    }

    #[test]
    fn patch_then_parse_roundtrip() {
        let mut header = header_template(WAV_SAMPLE_RATE);
        patch_sizes(&mut header, 2048);
        assert_eq!(get_u32(&header, 4), 2084);

        let info = parse_header(&header).unwrap();
        assert_eq!(info.sample_rate, WAV_SAMPLE_RATE);
        assert_eq!(info.channels, 1);
        assert_eq!(info.bits_per_sample, 16);
        assert_eq!(info.data_len, 2048);
    }

    #[test]
    fn parse_rejects_bad_magic() {
        let mut header = header_template(WAV_SAMPLE_RATE);
        header[0] = b'X';
        assert_eq!(parse_header(&header).unwrap_err(), WavError::BadMagic);
    }

    #[test]
    fn parse_rejects_stereo_and_non_pcm() {
        let mut stereo = header_template(WAV_SAMPLE_RATE);
        stereo[22] = 2;
        assert_eq!(parse_header(&stereo).unwrap_err(), WavError::Unsupported);

        let mut float = header_template(WAV_SAMPLE_RATE);
        float[20] = 3;
        assert_eq!(parse_header(&float).unwrap_err(), WavError::Unsupported);
    }
}
