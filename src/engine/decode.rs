//! Decoder adapters
//!
//! Turns raw file bytes into an [`AudioBuffer`]. WAV data is read with
//! `hound`; everything else is handed to `symphonia` when the `mp3` feature
//! is enabled.
//!
//! The decoder is a capability boundary: the pipeline only depends on the
//! [`Decoder`] trait, so tests can substitute an in-memory fake.

use std::io::Cursor;

use hound::{SampleFormat, WavReader};
use log::debug;

use crate::engine::buffer::AudioBuffer;
use crate::error::{RemixError, Result};

// ============================================================================
// Input description
// ============================================================================

/// Raw input bytes plus whatever is known about their format
#[derive(Debug, Clone, Default)]
pub struct AudioInput {
    /// Complete file contents
    pub bytes: Vec<u8>,
    /// Original file name, used for output naming and as a format hint
    pub name: Option<String>,
    /// Declared media type (e.g. `audio/mpeg`)
    pub media_type: Option<String>,
}

impl AudioInput {
    /// Wrap raw bytes with no format hints
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            ..Default::default()
        }
    }

    /// Attach the original file name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a declared media type
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Size of the input in bytes
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// True when there are no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lower-cased file extension of `name`, if any
    pub fn extension(&self) -> Option<String> {
        let name = self.name.as_deref()?;
        let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
        let (_, ext) = file.rsplit_once('.')?;
        (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
    }

    /// True when the bytes carry a RIFF/WAVE signature
    pub fn looks_like_wav(&self) -> bool {
        self.bytes.len() >= 12 && &self.bytes[0..4] == b"RIFF" && &self.bytes[8..12] == b"WAVE"
    }
}

// ============================================================================
// Decoder trait
// ============================================================================

/// Something that can turn file bytes into decoded audio
pub trait Decoder: Send + Sync {
    /// Decode the complete input
    ///
    /// # Errors
    /// * `Decode` - the bytes are not a decodable audio stream
    fn decode(&self, input: &AudioInput) -> Result<AudioBuffer>;
}

/// Reject streams that decode to nothing
fn ensure_not_empty(buffer: AudioBuffer) -> Result<AudioBuffer> {
    if buffer.is_empty() {
        return Err(RemixError::decode("stream contains no audio frames"));
    }
    Ok(buffer)
}

// ============================================================================
// WAV (hound)
// ============================================================================

/// PCM / float WAV decoder backed by `hound`
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl Decoder for WavDecoder {
    fn decode(&self, input: &AudioInput) -> Result<AudioBuffer> {
        let reader = WavReader::new(Cursor::new(&input.bytes[..])).map_err(|e| {
            RemixError::Decode {
                reason: format!("failed to parse WAV header: {}", e),
                source: Some(Box::new(e)),
            }
        })?;

        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(RemixError::decode("WAV header declares zero channels"));
        }

        debug!(
            "WAV stream: {} Hz, {} channel(s), {}-bit {:?}",
            spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
        );

        let samples = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
        let buffer = AudioBuffer::from_interleaved(&samples, spec.channels as usize, spec.sample_rate)
            .map_err(|e| RemixError::decode(e.to_string()))?;

        ensure_not_empty(buffer)
    }
}

/// Read samples from a WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let read_error = |bits: u16| {
        move |e: hound::Error| RemixError::Decode {
            reason: format!("failed to read {}-bit samples: {}", bits, e),
            source: Some(Box::new(e)),
        }
    };

    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(read_error(bits_per_sample)),
        SampleFormat::Int => match bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(read_error(8)),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(read_error(16)),
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8388608.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(read_error(24)),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(read_error(32)),
            other => Err(RemixError::decode(format!(
                "unsupported {}-bit integer WAV",
                other
            ))),
        },
    }
}

// ============================================================================
// Compressed formats (symphonia)
// ============================================================================

/// MP3 and other container decoder backed by `symphonia`
#[cfg(feature = "mp3")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

#[cfg(feature = "mp3")]
impl Decoder for SymphoniaDecoder {
    fn decode(&self, input: &AudioInput) -> Result<AudioBuffer> {
        use symphonia::core::audio::SampleBuffer;
        use symphonia::core::codecs::DecoderOptions;
        use symphonia::core::errors::Error as SymphoniaError;
        use symphonia::core::formats::FormatOptions;
        use symphonia::core::io::MediaSourceStream;
        use symphonia::core::meta::MetadataOptions;
        use symphonia::core::probe::Hint;
        use symphonia::default::{get_codecs, get_probe};

        let boxed = |e: SymphoniaError, what: &str| RemixError::Decode {
            reason: format!("{}: {}", what, e),
            source: Some(Box::new(e)),
        };

        let mut hint = Hint::new();
        if let Some(ext) = input.extension() {
            hint.with_extension(&ext);
        }
        if let Some(media_type) = input.media_type.as_deref() {
            hint.mime_type(media_type);
        }

        let mss = MediaSourceStream::new(Box::new(Cursor::new(input.bytes.clone())), Default::default());
        let probed = get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| boxed(e, "unrecognised audio container"))?;
        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| RemixError::decode("container has no audio track"))?;
        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let mut decoder = get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| boxed(e, "unsupported codec"))?;

        let mut sample_rate = codec_params.sample_rate;
        let mut channels = codec_params.channels.map(|c| c.count());
        let mut sample_buf: Option<SampleBuffer<f32>> = None;
        let mut buf_frames = 0;
        let mut interleaved = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break
                }
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(e) => return Err(boxed(e, "failed to read packet")),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                // Corrupt frames are skipped, matching browser decoders
                Err(SymphoniaError::DecodeError(msg)) => {
                    debug!("skipping undecodable packet: {}", msg);
                    continue;
                }
                Err(e) => return Err(boxed(e, "failed to decode packet")),
            };

            let spec = *decoded.spec();
            sample_rate.get_or_insert(spec.rate);
            channels.get_or_insert(spec.channels.count());

            if sample_buf.is_none() || decoded.capacity() > buf_frames {
                buf_frames = decoded.capacity();
                sample_buf = Some(SampleBuffer::<f32>::new(buf_frames as u64, spec));
            }

            if let Some(buf) = sample_buf.as_mut() {
                buf.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(buf.samples());
            }
        }

        let sample_rate = sample_rate.ok_or_else(|| RemixError::decode("unknown sample rate"))?;
        let channels = channels.ok_or_else(|| RemixError::decode("unknown channel count"))?;

        debug!(
            "compressed stream: {} Hz, {} channel(s), {} samples",
            sample_rate,
            channels,
            interleaved.len()
        );

        let buffer = AudioBuffer::from_interleaved(&interleaved, channels, sample_rate)
            .map_err(|e| RemixError::decode(e.to_string()))?;
        ensure_not_empty(buffer)
    }
}

// ============================================================================
// Format sniffing
// ============================================================================

/// Dispatches on the content signature: RIFF/WAVE goes to [`WavDecoder`],
/// anything else to [`SymphoniaDecoder`] (when available)
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDecoder;

impl Decoder for DefaultDecoder {
    fn decode(&self, input: &AudioInput) -> Result<AudioBuffer> {
        if input.looks_like_wav() {
            return WavDecoder.decode(input);
        }
        decode_compressed(input)
    }
}

#[cfg(feature = "mp3")]
fn decode_compressed(input: &AudioInput) -> Result<AudioBuffer> {
    SymphoniaDecoder.decode(input)
}

#[cfg(not(feature = "mp3"))]
fn decode_compressed(input: &AudioInput) -> Result<AudioBuffer> {
    Err(RemixError::decode(format!(
        "unsupported format{}",
        input
            .extension()
            .map(|ext| format!(" '.{}'", ext))
            .unwrap_or_default()
    )))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn wav_bytes(channels: u16, frames: usize, sample_rate: u32) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..frames {
                for ch in 0..channels {
                    let value = if ch == 0 { i as i16 * 100 } else { -(i as i16) * 100 };
                    writer.write_sample(value).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_extension_parsing() {
        assert_eq!(AudioInput::new(vec![]).with_name("a/b/Song.MP3").extension(), Some("mp3".into()));
        assert_eq!(AudioInput::new(vec![]).with_name("noext").extension(), None);
        assert_eq!(AudioInput::new(vec![]).with_name("dir.d/noext").extension(), None);
        assert_eq!(AudioInput::new(vec![]).extension(), None);
    }

    #[test]
    fn test_wav_decoder_reads_stereo() {
        let input = AudioInput::new(wav_bytes(2, 8, 22050));
        assert!(input.looks_like_wav());

        let buffer = WavDecoder.decode(&input).unwrap();
        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.num_frames(), 8);
        assert_eq!(buffer.sample_rate(), 22050);
        assert!((buffer.channel(0)[3] - 300.0 / 32768.0).abs() < 1e-6);
        assert!((buffer.channel(1)[3] + 300.0 / 32768.0).abs() < 1e-6);
    }

    #[test]
    fn test_wav_decoder_rejects_garbage() {
        let input = AudioInput::new(b"definitely not audio".to_vec());
        let err = WavDecoder.decode(&input).unwrap_err();
        assert_eq!(err.error_code(), "DECODE_ERROR");
    }

    #[test]
    fn test_empty_wav_is_a_decode_error() {
        let input = AudioInput::new(wav_bytes(1, 0, 44100));
        assert!(matches!(
            DefaultDecoder.decode(&input),
            Err(RemixError::Decode { .. })
        ));
    }

    #[test]
    fn test_default_decoder_sniffs_wav() {
        let input = AudioInput::new(wav_bytes(1, 16, 44100)).with_name("clip.mp3");
        let buffer = DefaultDecoder.decode(&input).unwrap();
        assert_eq!(buffer.num_frames(), 16);
    }

    #[test]
    fn test_default_decoder_rejects_unknown_bytes() {
        let input = AudioInput::new(vec![0u8; 512]).with_name("noise.bin");
        assert!(matches!(
            DefaultDecoder.decode(&input),
            Err(RemixError::Decode { .. })
        ));
    }
}
