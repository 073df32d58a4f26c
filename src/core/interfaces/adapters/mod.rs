mod speech_synthesizer;
mod state_store;
mod vision_analyzer;

pub use speech_synthesizer::{SpeechCallbacks, SpeechOptions, SpeechSynthesizer};
pub use state_store::StateStore;
pub use vision_analyzer::VisionAnalyzer;
