use anyhow::Result;
use async_trait::async_trait;

use crate::global_constants;

/// Cosmetic voice parameters, in the browser speech-synthesis ranges the
/// original interface used (rate/pitch/volume around 1.0).
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOptions {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            rate: global_constants::DEFAULT_SPEECH_RATE,
            pitch: global_constants::DEFAULT_SPEECH_PITCH,
            volume: global_constants::DEFAULT_SPEECH_VOLUME,
        }
    }
}

type SpeechCallback = Box<dyn Fn() + Send + Sync>;
type SpeechErrorCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Lifecycle hooks for one utterance. All optional; `on_end` fires when the
/// utterance finishes cleanly, `on_error` when the engine fails. A stopped
/// utterance fires neither.
#[derive(Default)]
pub struct SpeechCallbacks {
    pub on_start: Option<SpeechCallback>,
    pub on_end: Option<SpeechCallback>,
    pub on_error: Option<SpeechErrorCallback>,
}

impl std::fmt::Debug for SpeechCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechCallbacks")
            .field("on_start", &self.on_start.is_some())
            .field("on_end", &self.on_end.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Text-to-speech output. Speaking is cancellable at any time; starting a
/// new utterance stops the previous one first.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Begins speaking and returns once the utterance has started.
    async fn speak(&self, text: &str, options: SpeechOptions, callbacks: SpeechCallbacks)
        -> Result<()>;

    /// Stops any in-progress utterance. Idempotent.
    async fn stop(&self);

    fn is_speaking(&self) -> bool;
}
