#![allow(dead_code)]

pub const APPLICATION_NAME: &str = "WhisperLens - Desktop";
pub const APPLICATION_TITLE: &str = "WhisperLens";

pub const LOG_TAG_APP: &str = "[APP]";
pub const LOG_TAG_SESSION: &str = "[SESSION]";
pub const LOG_TAG_GEMINI: &str = "[GEMINI]";
pub const LOG_TAG_SPEECH: &str = "[SPEECH]";
pub const LOG_TAG_STORE: &str = "[STORE]";

pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const GEMINI_VISION_MODEL: &str = "gemini-2.5-flash";

pub const API_KEY_ENV_VAR: &str = "WHISPERLENS_GEMINI_API_KEY";

pub const CREDENTIAL_STORAGE_KEY: &str = "gemini_api_key";
pub const HISTORY_STORAGE_KEY: &str = "whisperlens_history";

pub const HISTORY_CAPACITY: usize = 20;

pub const CAPTURE_MIME_TYPE: &str = "image/jpeg";

pub const SECTION_LABEL_NAME: &str = "Object Name";
pub const SECTION_LABEL_DESCRIPTION: &str = "What It Is";
pub const SECTION_LABEL_USAGE: &str = "How It's Used";
pub const SECTION_LABEL_FUN_FACT: &str = "Fun Fact";

pub const DEFAULT_SPEECH_RATE: f32 = 0.9;
pub const DEFAULT_SPEECH_PITCH: f32 = 1.0;
pub const DEFAULT_SPEECH_VOLUME: f32 = 1.0;

pub const CONFIG_DIR_NAME: &str = "whisperlens";

pub const ANALYSIS_PROMPT: &str = r#"You are WhisperLens, a friendly AI narrator that helps people understand the world around them.

Analyze this image and provide a response in the following format:

**Object Name:** [Clear, simple name of the main object]

**What It Is:** [Brief, engaging description of what this object is - 2-3 sentences]

**How It's Used:** [Practical information about how people use this object - 2-3 sentences]

**Fun Fact:** [An interesting, educational, or surprising fact about this object - 1-2 sentences]

Make your response:
- Educational yet conversational
- Suitable for all ages (especially kids and curious learners)
- Culturally aware and respectful
- Focused on the most prominent object in the image
- Engaging and memorable

If you see multiple objects, focus on the most prominent or interesting one."#;

pub const STARTUP_BANNER: &str = r#"
╔════════════════════════════════════════════════════════╗
║  WhisperLens - Desktop                                 ║
║                                                        ║
║  Point it at a picture, hear what it sees.             ║
║                                                        ║
║  analyze <path>   capture and describe an image        ║
║  speak / stop     read the current result aloud        ║
║  history          list past captures                   ║
║  quit             exit                                 ║
║                                                        ║
╚════════════════════════════════════════════════════════╝
"#;
