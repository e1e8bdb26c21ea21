//! Processing pipeline
//!
//! Size check → decode → (reverse) → build graph → render → encode, with
//! progress reported at each milestone. One call owns every buffer it
//! creates; a [`Processor`] holds no mutable state and can be shared between
//! threads.

#[cfg(feature = "async-bridge")]
mod async_bridge;
mod progress;

#[cfg(feature = "async-bridge")]
pub use async_bridge::process_async;
pub use progress::{Milestone, ProgressReporter, ProgressTracker};

use log::{debug, info, warn};

use crate::config::{ProcessorConfig, DEFAULT_OUTPUT_PREFIX};
use crate::effects::{resolve_parameters, EffectType};
use crate::engine::{
    encode_wav, AudioInput, CancellationToken, Decoder, DefaultDecoder, GraphRenderer,
    OfflineRenderer, WavBlob,
};
use crate::error::{RemixError, Result};
use crate::graph::build_graph;

/// Runs the effect pipeline with a decoder and a renderer
pub struct Processor<D: Decoder = DefaultDecoder, R: OfflineRenderer = GraphRenderer> {
    config: ProcessorConfig,
    decoder: D,
    renderer: R,
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(ProcessorConfig::default())
    }
}

impl Processor {
    /// Processor with the default decoder and renderer
    pub fn new(config: ProcessorConfig) -> Self {
        let renderer = GraphRenderer::new().with_max_samples(config.render_sample_limit());
        Self::with_components(config, DefaultDecoder, renderer)
    }
}

impl<D: Decoder, R: OfflineRenderer> Processor<D, R> {
    /// Processor with a custom decoder and renderer
    pub fn with_components(config: ProcessorConfig, decoder: D, renderer: R) -> Self {
        Self {
            config,
            decoder,
            renderer,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Apply `effect` to `input` and return the encoded WAV
    ///
    /// # Errors
    /// * `Oversize` - input larger than `max_input_bytes`, nothing decoded
    /// * `Decode` - the bytes are not decodable audio
    /// * `Render` - the graph could not be rendered
    /// * `Encode` - the output does not fit a WAV file
    ///
    /// On error the reporter is reset and no output is produced.
    pub fn process<P>(&self, input: &AudioInput, effect: EffectType, progress: &mut P) -> Result<WavBlob>
    where
        P: ProgressReporter + ?Sized,
    {
        self.process_with_cancel(input, effect, progress, &CancellationToken::new())
    }

    /// [`process`](Self::process) with cooperative cancellation
    ///
    /// The token is checked before decoding, before rendering, during
    /// rendering and before encoding.
    pub fn process_with_cancel<P>(
        &self,
        input: &AudioInput,
        effect: EffectType,
        progress: &mut P,
        cancel: &CancellationToken,
    ) -> Result<WavBlob>
    where
        P: ProgressReporter + ?Sized,
    {
        let mut tracker = ProgressTracker::new(progress);
        match self.run(input, effect, &mut tracker, cancel) {
            Ok(blob) => Ok(blob),
            Err(err) => {
                warn!("{} failed [{}]: {}", effect, err.error_code(), err);
                tracker.fail();
                Err(err)
            }
        }
    }

    fn run<P>(
        &self,
        input: &AudioInput,
        effect: EffectType,
        tracker: &mut ProgressTracker<'_, P>,
        cancel: &CancellationToken,
    ) -> Result<WavBlob>
    where
        P: ProgressReporter + ?Sized,
    {
        let size = input.len();
        if size > self.config.max_input_bytes {
            return Err(RemixError::Oversize {
                size,
                limit: self.config.max_input_bytes,
            });
        }
        tracker.advance(Milestone::Accepted);
        info!(
            "Processing {} ({} bytes) with {}",
            input.name.as_deref().unwrap_or("<unnamed>"),
            size,
            effect
        );

        cancel.check()?;
        tracker.advance(Milestone::DecodeStarted);
        let mut audio = self.decoder.decode(input)?;
        tracker.advance(Milestone::Decoded);
        debug!(
            "Decoded {} frames x {} channels at {} Hz",
            audio.num_frames(),
            audio.num_channels(),
            audio.sample_rate()
        );

        let params = resolve_parameters(effect);
        if params.reverses_input() {
            audio.reverse();
        }
        let graph = build_graph(audio, &params);

        cancel.check()?;
        tracker.advance(Milestone::RenderStarted);
        let rendered = self.renderer.render(&graph, cancel)?;
        tracker.advance(Milestone::Rendered);

        cancel.check()?;
        let blob = encode_wav(&rendered)?;
        tracker.advance(Milestone::Complete);
        info!("Encoded {} bytes", blob.len());

        Ok(blob)
    }

    /// Download name for a processed file
    pub fn output_file_name(&self, original: &str) -> String {
        output_file_name(original, &self.config.output_prefix)
    }
}

/// Process raw file bytes with the default processor
pub fn process_audio_file<F>(bytes: Vec<u8>, effect: EffectType, mut on_progress: F) -> Result<WavBlob>
where
    F: FnMut(u8),
{
    Processor::new(ProcessorConfig::default()).process(&AudioInput::new(bytes), effect, &mut on_progress)
}

/// `{prefix}{stem}.wav`, where the stem is `original` minus its last
/// extension
///
/// Only a trailing `.ext` with no `/` in it counts as an extension.
pub fn output_file_name(original: &str, prefix: &str) -> String {
    let stem = match original.rfind('.') {
        Some(idx) if idx + 1 < original.len() && !original[idx + 1..].contains('/') => {
            &original[..idx]
        }
        _ => original,
    };
    format!("{}{}.wav", prefix, stem)
}

/// [`output_file_name`] with the default prefix
pub fn default_output_file_name(original: &str) -> String {
    output_file_name(original, DEFAULT_OUTPUT_PREFIX)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AudioBuffer;

    #[test]
    fn test_output_file_name() {
        assert_eq!(default_output_file_name("song.mp3"), "GOH_REMIX_song.wav");
        assert_eq!(default_output_file_name("my.track.flac"), "GOH_REMIX_my.track.wav");
        assert_eq!(default_output_file_name("noext"), "GOH_REMIX_noext.wav");
        assert_eq!(default_output_file_name("dir.v2/file"), "GOH_REMIX_dir.v2/file.wav");
        assert_eq!(default_output_file_name("trailing."), "GOH_REMIX_trailing..wav");
        assert_eq!(output_file_name("a.wav", "X_"), "X_a.wav");
    }

    struct FixedDecoder(AudioBuffer);

    impl Decoder for FixedDecoder {
        fn decode(&self, _input: &AudioInput) -> Result<AudioBuffer> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_reverse_reverses_before_render() {
        let audio = AudioBuffer::from_channels(vec![vec![0.5, 0.25, 0.0, -0.25]], 8000).unwrap();
        let processor = Processor::with_components(
            ProcessorConfig::default(),
            FixedDecoder(audio),
            GraphRenderer::new(),
        );

        let blob = processor
            .process(&AudioInput::new(vec![0; 8]), EffectType::Reverse, &mut |_: u8| {})
            .unwrap();
        let pcm: Vec<i16> = blob.as_bytes()[44..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(pcm, vec![-8192, 0, 8191, 16383]);
    }

    #[test]
    fn test_render_limit_comes_from_config() {
        let config = ProcessorConfig {
            max_render_samples: Some(2),
            ..ProcessorConfig::default()
        };
        let audio = AudioBuffer::from_channels(vec![vec![0.0; 4]], 8000).unwrap();
        let processor = Processor::with_components(
            config.clone(),
            FixedDecoder(audio),
            GraphRenderer::new().with_max_samples(config.render_sample_limit()),
        );

        let err = processor
            .process(&AudioInput::new(vec![0; 8]), EffectType::BassBoost, &mut |_: u8| {})
            .unwrap_err();
        assert!(err.is_resource_exhaustion());
    }
}
