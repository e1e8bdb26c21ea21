//! Audio Engine Module
//!
//! Everything between file bytes and rendered audio:
//! - Audio buffer management
//! - Decoding (hound, symphonia)
//! - Offline graph rendering
//! - WAV serialization

pub mod buffer;
pub mod cancel;
pub mod decode;
pub mod render;
pub mod wav;

pub use buffer::AudioBuffer;
pub use cancel::CancellationToken;
#[cfg(feature = "mp3")]
pub use decode::SymphoniaDecoder;
pub use decode::{AudioInput, Decoder, DefaultDecoder, WavDecoder};
pub use render::{GraphRenderer, OfflineRenderer};
pub use wav::{encode_wav, quantize_sample, WavBlob};
