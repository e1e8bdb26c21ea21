//! WAV Export
//!
//! Serializes a rendered buffer into a canonical 44-byte-header RIFF/WAVE
//! container with 16-bit little-endian PCM samples. The layout is written
//! by hand so the output is byte-exact for every channel count.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::engine::buffer::AudioBuffer;
use crate::error::{RemixError, Result};

/// Size of the canonical PCM header
pub const WAV_HEADER_LEN: usize = 44;

/// Bytes per encoded sample (16-bit PCM)
const BYTES_PER_SAMPLE: u32 = 2;

/// Largest data chunk whose RIFF size (`36 + data`) still fits in a u32
pub const MAX_DATA_BYTES: u64 = u32::MAX as u64 - 36;

/// Encoded WAV file held in memory
///
/// Ownership of the bytes passes to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavBlob {
    bytes: Vec<u8>,
}

impl WavBlob {
    /// MIME type of the container
    pub fn mime_type(&self) -> &'static str {
        "audio/wav"
    }

    /// Total size in bytes (header + data)
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when there are no bytes (never the case for an encoded blob)
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take ownership of the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write the blob to disk
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }

    /// SHA-256 of the encoded bytes as lowercase hex
    pub fn sha256_hex(&self) -> String {
        format!("{:x}", Sha256::digest(&self.bytes))
    }
}

/// Quantize one float sample to signed 16-bit
///
/// Clamps to [-1, 1], then scales negative values by 32768 and
/// non-negative values by 32767 so the full i16 range is reachable and
/// never exceeded.
#[inline]
pub fn quantize_sample(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode a buffer as 16-bit PCM WAV
///
/// # Errors
/// * `Encode` - the data chunk, byte rate or block align would not fit the
///   header's size fields
pub fn encode_wav(audio: &AudioBuffer) -> Result<WavBlob> {
    let channels = audio.num_channels();
    let frames = audio.num_frames();

    let data_bytes = frames as u64 * channels as u64 * BYTES_PER_SAMPLE as u64;
    if data_bytes > MAX_DATA_BYTES {
        return Err(RemixError::Encode {
            reason: format!(
                "{} data bytes exceed the RIFF limit of {}",
                data_bytes, MAX_DATA_BYTES
            ),
        });
    }
    let num_channels = u16::try_from(channels).map_err(|_| RemixError::Encode {
        reason: format!("{} channels cannot be described by a WAV header", channels),
    })?;

    let data_bytes = data_bytes as u32;
    let sample_rate = audio.sample_rate();
    let block_align = num_channels as u32 * BYTES_PER_SAMPLE;
    let byte_rate = sample_rate
        .checked_mul(block_align)
        .ok_or_else(|| RemixError::Encode {
            reason: format!(
                "byte rate of {} Hz x {} bytes per frame exceeds 32 bits",
                sample_rate, block_align
            ),
        })?;
    let block_align = u16::try_from(block_align).map_err(|_| RemixError::Encode {
        reason: format!("block align of {} bytes exceeds 16 bits", block_align),
    })?;

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + data_bytes as usize);

    // RIFF chunk descriptor
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_bytes).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    // fmt sub-chunk
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16_u32.to_le_bytes());
    bytes.extend_from_slice(&1_u16.to_le_bytes()); // integer PCM
    bytes.extend_from_slice(&num_channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&16_u16.to_le_bytes());

    // data sub-chunk
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_bytes.to_le_bytes());

    for frame in 0..frames {
        for channel in audio.channels() {
            bytes.extend_from_slice(&quantize_sample(channel[frame]).to_le_bytes());
        }
    }

    Ok(WavBlob { bytes })
}

// ============================================================================
// Tests
// ============================================================================
