//! Tokio bridge
//!
//! Runs the blocking pipeline on tokio's blocking pool so async callers can
//! await it without stalling their executor.

use std::sync::Arc;

use super::{ProgressReporter, Processor};
use crate::effects::EffectType;
use crate::engine::{AudioInput, CancellationToken, Decoder, OfflineRenderer, WavBlob};
use crate::error::{RemixError, RenderFailure, Result};

/// Process on the blocking pool and await the result
///
/// Cancel through `cancel`; dropping the future does not stop the work.
pub async fn process_async<D, R, P>(
    processor: Arc<Processor<D, R>>,
    input: AudioInput,
    effect: EffectType,
    mut progress: P,
    cancel: CancellationToken,
) -> Result<WavBlob>
where
    D: Decoder + 'static,
    R: OfflineRenderer + 'static,
    P: ProgressReporter + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        processor.process_with_cancel(&input, effect, &mut progress, &cancel)
    })
    .await
    .map_err(|e| RemixError::render(RenderFailure::Other, format!("processing task failed: {}", e)))?
}
