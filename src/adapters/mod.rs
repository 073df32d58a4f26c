mod command_speech_synthesizer;
mod gemini_vision_analyzer;
mod json_file_store;

pub use command_speech_synthesizer::CommandSpeechSynthesizer;
pub use gemini_vision_analyzer::GeminiVisionAnalyzer;
pub use json_file_store::JsonFileStore;
