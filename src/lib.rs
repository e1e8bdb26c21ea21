//! Remixer - Offline Audio Effect Processing
//!
//! Takes the bytes of an audio file, applies one of a fixed set of named
//! effects and returns a 16-bit PCM WAV file.
//!
//! # Architecture
//!
//! Processing is a linear pipeline:
//! - Decode: file bytes → [`AudioBuffer`](engine::AudioBuffer)
//! - Resolve: [`EffectType`](effects::EffectType) → effect parameters
//! - Build: buffer + parameters → [`ProcessingGraph`](graph::ProcessingGraph)
//! - Render: graph → rendered buffer (offline, whole file at once)
//! - Encode: rendered buffer → [`WavBlob`](engine::WavBlob)
//!
//! ```no_run
//! use remixer::{process_audio_file, EffectType};
//!
//! let bytes = std::fs::read("song.wav").unwrap();
//! let wav = process_audio_file(bytes, EffectType::Nightcore, |p| println!("{p}%")).unwrap();
//! wav.write_to(std::path::Path::new("GOH_REMIX_song.wav")).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod dsp;
pub mod effects;
pub mod engine;
pub mod error;
pub mod graph;
pub mod pipeline;

pub use config::ProcessorConfig;
pub use effects::{resolve_parameters, EffectParameters, EffectType};
pub use engine::{AudioBuffer, AudioInput, CancellationToken, WavBlob};
pub use error::{RemixError, RenderFailure, Result};
pub use pipeline::{output_file_name, process_audio_file, Processor, ProgressReporter};
