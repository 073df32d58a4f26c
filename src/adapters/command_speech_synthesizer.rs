use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use crate::core::interfaces::adapters::{SpeechCallbacks, SpeechOptions, SpeechSynthesizer};

/// Speech output driven by the system TTS command: `say` on macOS,
/// `espeak-ng`/`espeak` elsewhere. Each utterance is one child process, so
/// stopping is a kill. Best-effort: a machine without any engine still
/// constructs, and `speak` reports the missing engine per call.
pub struct CommandSpeechSynthesizer {
    engine: Option<TtsEngine>,
    preferred_voice: Option<String>,
    current: Arc<Mutex<Option<ActiveUtterance>>>,
    speaking: Arc<AtomicBool>,
    utterance_seq: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineKind {
    Say,
    Espeak,
}

#[derive(Debug, Clone)]
struct TtsEngine {
    command: String,
    kind: EngineKind,
}

struct ActiveUtterance {
    id: u64,
    child: Child,
}

/// One voice the engine offers, as listed by `say -v ?` or `--voices`.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceInfo {
    pub name: String,
    pub language: String,
}

const VOICE_QUALITY_HINTS: [&str; 4] = ["premium", "enhanced", "natural", "google"];
const BASELINE_WORDS_PER_MINUTE: f32 = 175.0;

impl CommandSpeechSynthesizer {
    pub fn new() -> Self {
        let engine = detect_engine();
        let preferred_voice = engine.as_ref().and_then(pick_voice_for_engine);

        match &engine {
            Some(engine) => log::info!(
                "[SPEECH] Using '{}' engine, preferred voice: {:?}",
                engine.command,
                preferred_voice
            ),
            None => log::warn!("[SPEECH] No speech engine found, narration disabled"),
        }

        Self {
            engine,
            preferred_voice,
            current: Arc::new(Mutex::new(None)),
            speaking: Arc::new(AtomicBool::new(false)),
            utterance_seq: AtomicU64::new(0),
        }
    }
}

impl Default for CommandSpeechSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSpeechSynthesizer {
    async fn speak(
        &self,
        text: &str,
        options: SpeechOptions,
        callbacks: SpeechCallbacks,
    ) -> Result<()> {
        let Some(engine) = &self.engine else {
            anyhow::bail!("Speech synthesis not supported on this system");
        };

        // Stop-before-start: never queue behind a previous utterance.
        self.stop().await;

        let args = build_engine_args(engine.kind, &options, self.preferred_voice.as_deref(), text);
        log::debug!("[SPEECH] Spawning {} {:?}", engine.command, args);

        let spawned = Command::new(&engine.command)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let child = match spawned {
            Ok(child) => child,
            Err(error) => {
                log::error!("[SPEECH] Failed to start '{}': {}", engine.command, error);
                if let Some(on_error) = &callbacks.on_error {
                    on_error(&error.to_string());
                }
                return Err(error.into());
            }
        };

        let id = self.utterance_seq.fetch_add(1, Ordering::SeqCst) + 1;
        *self.current.lock().await = Some(ActiveUtterance { id, child });
        self.speaking.store(true, Ordering::SeqCst);

        if let Some(on_start) = &callbacks.on_start {
            on_start();
        }

        let current = Arc::clone(&self.current);
        let speaking = Arc::clone(&self.speaking);
        tokio::spawn(async move {
            watch_utterance(id, current, speaking, callbacks).await;
        });

        Ok(())
    }

    async fn stop(&self) {
        let mut guard = self.current.lock().await;
        if let Some(mut active) = guard.take() {
            log::debug!("[SPEECH] Stopping utterance {}", active.id);
            if let Err(error) = active.child.kill().await {
                log::warn!("[SPEECH] Failed to kill utterance: {}", error);
            }
        }
        self.speaking.store(false, Ordering::SeqCst);
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }
}

/// Polls the child until it exits, is superseded, or is stopped. Only clean
/// exits reach `on_end`; a stopped utterance fires neither callback.
async fn watch_utterance(
    id: u64,
    current: Arc<Mutex<Option<ActiveUtterance>>>,
    speaking: Arc<AtomicBool>,
    callbacks: SpeechCallbacks,
) {
    loop {
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut guard = current.lock().await;
        let Some(active) = guard.as_mut() else {
            return;
        };
        if active.id != id {
            return;
        }

        match active.child.try_wait() {
            Ok(None) => {}
            Ok(Some(status)) => {
                *guard = None;
                speaking.store(false, Ordering::SeqCst);
                drop(guard);

                if status.success() {
                    log::debug!("[SPEECH] Utterance {} finished", id);
                    if let Some(on_end) = &callbacks.on_end {
                        on_end();
                    }
                } else {
                    log::warn!("[SPEECH] Utterance {} exited with {}", id, status);
                    if let Some(on_error) = &callbacks.on_error {
                        on_error(&format!("speech engine exited with {}", status));
                    }
                }
                return;
            }
            Err(error) => {
                *guard = None;
                speaking.store(false, Ordering::SeqCst);
                drop(guard);

                log::error!("[SPEECH] Failed to poll utterance {}: {}", id, error);
                if let Some(on_error) = &callbacks.on_error {
                    on_error(&error.to_string());
                }
                return;
            }
        }
    }
}

#[cfg(target_os = "macos")]
fn detect_engine() -> Option<TtsEngine> {
    Some(TtsEngine {
        command: "say".to_string(),
        kind: EngineKind::Say,
    })
}

#[cfg(not(target_os = "macos"))]
fn detect_engine() -> Option<TtsEngine> {
    for candidate in ["espeak-ng", "espeak"] {
        let probe = std::process::Command::new(candidate)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if matches!(probe, Ok(status) if status.success()) {
            return Some(TtsEngine {
                command: candidate.to_string(),
                kind: EngineKind::Espeak,
            });
        }
    }
    None
}

fn pick_voice_for_engine(engine: &TtsEngine) -> Option<String> {
    let listing = match engine.kind {
        EngineKind::Say => std::process::Command::new(&engine.command)
            .args(["-v", "?"])
            .output(),
        EngineKind::Espeak => std::process::Command::new(&engine.command)
            .arg("--voices=en")
            .output(),
    };

    let output = match listing {
        Ok(output) => String::from_utf8_lossy(&output.stdout).to_string(),
        Err(error) => {
            log::debug!("[SPEECH] Could not list voices: {}", error);
            return None;
        }
    };

    let voices = match engine.kind {
        EngineKind::Say => parse_say_voices(&output),
        EngineKind::Espeak => parse_espeak_voices(&output),
    };

    pick_preferred_voice(&voices)
}

/// `say -v ?` lines look like `Samantha            en_US    # Hello ...`.
fn parse_say_voices(output: &str) -> Vec<VoiceInfo> {
    output
        .lines()
        .filter_map(|line| {
            let entry = line.split('#').next().unwrap_or(line).trim_end();
            let language = entry.split_whitespace().last()?;
            let name = entry
                .strip_suffix(language)
                .map(str::trim)
                .filter(|name| !name.is_empty())?;
            Some(VoiceInfo {
                name: name.to_string(),
                language: language.to_string(),
            })
        })
        .collect()
}

/// `espeak --voices=en` columns: Pty Language Age/Gender VoiceName File.
fn parse_espeak_voices(output: &str) -> Vec<VoiceInfo> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 {
                return None;
            }
            Some(VoiceInfo {
                name: fields[3].to_string(),
                language: fields[1].to_string(),
            })
        })
        .collect()
}

/// Prefer an English voice whose name suggests higher quality, then any
/// English voice, then leave the engine default in charge.
pub fn pick_preferred_voice(voices: &[VoiceInfo]) -> Option<String> {
    let english: Vec<&VoiceInfo> = voices
        .iter()
        .filter(|voice| voice.language.to_lowercase().starts_with("en"))
        .collect();

    english
        .iter()
        .find(|voice| {
            let name = voice.name.to_lowercase();
            VOICE_QUALITY_HINTS.iter().any(|hint| name.contains(hint))
        })
        .or_else(|| english.first())
        .map(|voice| voice.name.clone())
}

/// Maps the browser-range options (rate/pitch/volume around 1.0) onto the
/// engine's flags. The text is always the final argument.
fn build_engine_args(
    kind: EngineKind,
    options: &SpeechOptions,
    voice: Option<&str>,
    text: &str,
) -> Vec<String> {
    let words_per_minute = (BASELINE_WORDS_PER_MINUTE * options.rate).round() as u32;

    let mut args = Vec::new();
    match kind {
        EngineKind::Say => {
            args.extend(["-r".to_string(), words_per_minute.to_string()]);
            if let Some(voice) = voice {
                args.extend(["-v".to_string(), voice.to_string()]);
            }
        }
        EngineKind::Espeak => {
            let pitch = ((options.pitch * 50.0).round() as i64).clamp(0, 99);
            let amplitude = ((options.volume * 100.0).round() as i64).clamp(0, 200);
            args.extend(["-s".to_string(), words_per_minute.to_string()]);
            args.extend(["-p".to_string(), pitch.to_string()]);
            args.extend(["-a".to_string(), amplitude.to_string()]);
            if let Some(voice) = voice {
                args.extend(["-v".to_string(), voice.to_string()]);
            }
        }
    }
    args.push(text.to_string());
    args
}
