use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;

use crate::adapters::{CommandSpeechSynthesizer, GeminiVisionAnalyzer, JsonFileStore};
use crate::core::interfaces::adapters::{SpeechCallbacks, StateStore};
use crate::core::interfaces::ports::ImageSource;
use crate::core::models::AnalysisResult;
use crate::core::orchestrators::SessionOrchestrator;
use crate::global_constants;
use crate::ports::FileImageSource;

/// The assembled application: a session orchestrator wired to the Gemini
/// analyzer, the system speech engine, and file-backed persistence.
pub struct WhisperApp {
    session: SessionOrchestrator,
    image_source: Arc<dyn ImageSource>,
}

impl WhisperApp {
    pub fn build(api_key: Option<String>) -> Result<Self> {
        log::info!("[APP] Initializing application");

        let store: Arc<dyn StateStore> = match JsonFileStore::in_config_dir() {
            Ok(store) => Arc::new(store),
            Err(error) => {
                log::warn!(
                    "[APP] Config directory unavailable ({}), persisting to temp dir",
                    error
                );
                Arc::new(JsonFileStore::at(
                    std::env::temp_dir().join(global_constants::CONFIG_DIR_NAME),
                ))
            }
        };

        let analyzer = Arc::new(GeminiVisionAnalyzer::new());
        let speech = Arc::new(CommandSpeechSynthesizer::new());

        let mut session = SessionOrchestrator::build(analyzer, speech, store);
        session.bootstrap_credential(api_key);

        Ok(Self {
            session,
            image_source: Arc::new(FileImageSource::new()),
        })
    }

    /// One-shot: capture, analyze, print, optionally narrate, exit.
    pub async fn analyze_once(&mut self, image_path: &str, narrate: bool) -> Result<()> {
        self.ensure_credential().await?;

        let image = self.image_source.acquire(image_path).await?;
        self.session.capture_and_analyze(image).await;

        if let Some(message) = self.session.current_error() {
            anyhow::bail!("{}", message);
        }

        if let Some(result) = self.session.current_result() {
            print_result(result);
        }

        if narrate {
            self.narrate_and_wait().await?;
        }

        Ok(())
    }

    pub fn print_history(&self) {
        if self.session.history().is_empty() {
            println!("No captures retained yet.");
            return;
        }

        for (index, entry) in self.session.history().entries().iter().enumerate() {
            let name = if entry.result.name.is_empty() {
                "(unnamed)"
            } else {
                &entry.result.name
            };
            println!("[{:>2}] {}  (captured at {} ms)", index, name, entry.timestamp);
        }
    }

    pub fn clear_history(&mut self) {
        self.session.clear_history();
        println!("History cleared.");
    }

    /// Interactive loop: analyze images, replay history, narrate results.
    pub async fn run_interactive(&mut self) -> Result<()> {
        println!("{}", global_constants::STARTUP_BANNER);

        if !self.session.has_credential() {
            self.prompt_for_key().await?;
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let mut words = line.split_whitespace();
            let Some(command) = words.next() else {
                continue;
            };

            match (command, words.next()) {
                ("analyze", Some(path)) => {
                    if self.session.is_loading() {
                        println!("Still analyzing the previous capture - hang on.");
                        continue;
                    }
                    if !self.session.has_credential() {
                        println!("No API key installed - use 'set-key <key>' first.");
                        continue;
                    }
                    self.handle_analyze(path).await;
                }
                ("analyze", None) => println!("Usage: analyze <image-path>"),
                ("speak", _) => self.handle_speak().await,
                ("stop", _) => self.session.stop_speaking().await,
                ("history", _) => self.print_history(),
                ("select", Some(index)) => self.handle_select(index).await,
                ("select", None) => println!("Usage: select <history-index>"),
                ("clear-history", _) => self.clear_history(),
                ("set-key", Some(key)) => match self.session.install_credential(key) {
                    Ok(()) => println!("API key saved."),
                    Err(error) => println!("{}", error),
                },
                ("set-key", None) => println!("Usage: set-key <api-key>"),
                ("help", _) => print_help(),
                ("quit" | "exit", _) => break,
                (other, _) => println!("Unknown command '{}' - try 'help'.", other),
            }
        }

        self.session.stop_speaking().await;
        log::info!("[APP] Exiting application");
        Ok(())
    }

    async fn handle_analyze(&mut self, path: &str) {
        let image = match self.image_source.acquire(path).await {
            Ok(image) => image,
            Err(error) => {
                println!("{}", error);
                return;
            }
        };

        println!("Analyzing...");
        self.session.capture_and_analyze(image).await;

        if let Some(message) = self.session.current_error() {
            println!("{}", message);
        } else if let Some(result) = self.session.current_result() {
            print_result(result);
        }
    }

    /// Toggle: stop if already speaking, otherwise narrate the current result.
    async fn handle_speak(&mut self) {
        if self.session.is_speaking() {
            self.session.stop_speaking().await;
            return;
        }

        let callbacks = SpeechCallbacks {
            on_start: Some(Box::new(|| println!("Speaking..."))),
            on_error: Some(Box::new(|message| println!("Speech failed: {}", message))),
            ..Default::default()
        };

        if let Err(error) = self.session.speak_current(callbacks).await {
            println!("{}", error);
        }
    }

    async fn handle_select(&mut self, index: &str) {
        let Ok(index) = index.parse::<usize>() else {
            println!("Usage: select <history-index>");
            return;
        };

        if self.session.select_history_entry(index).await {
            if let Some(result) = self.session.current_result() {
                print_result(result);
            }
        } else {
            println!("No history entry at index {}.", index);
        }
    }

    async fn ensure_credential(&mut self) -> Result<()> {
        if self.session.has_credential() {
            return Ok(());
        }
        self.prompt_for_key().await
    }

    async fn prompt_for_key(&mut self) -> Result<()> {
        println!(
            "No API key installed. Enter a Gemini API key (or set {}):",
            global_constants::API_KEY_ENV_VAR
        );
        print!("API key: ");
        std::io::stdout().flush()?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let Some(line) = lines.next_line().await? else {
            anyhow::bail!("No API key provided");
        };

        self.session.install_credential(line.trim())?;
        println!("API key saved.");
        Ok(())
    }

    /// Narrates the current result and blocks until the utterance ends, so
    /// one-shot runs do not exit mid-sentence.
    async fn narrate_and_wait(&mut self) -> Result<()> {
        let finished = Arc::new(Notify::new());

        let on_end = Arc::clone(&finished);
        let on_error = Arc::clone(&finished);
        let callbacks = SpeechCallbacks {
            on_start: None,
            on_end: Some(Box::new(move || on_end.notify_one())),
            on_error: Some(Box::new(move |message| {
                eprintln!("Speech failed: {}", message);
                on_error.notify_one();
            })),
        };

        self.session.speak_current(callbacks).await?;
        finished.notified().await;
        Ok(())
    }
}

fn print_result(result: &AnalysisResult) {
    let sections = [
        (global_constants::SECTION_LABEL_NAME, &result.name),
        (
            global_constants::SECTION_LABEL_DESCRIPTION,
            &result.description,
        ),
        (global_constants::SECTION_LABEL_USAGE, &result.usage),
        (global_constants::SECTION_LABEL_FUN_FACT, &result.fun_fact),
    ];

    let any_parsed = sections.iter().any(|(_, body)| !body.is_empty());
    if !any_parsed {
        // The model went off-template; the raw reply is still worth showing.
        println!("{}", result.full_text);
        return;
    }

    println!();
    for (label, body) in sections {
        if !body.is_empty() {
            println!("{}: {}", label, body);
        }
    }
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  analyze <path>    capture an image file and describe it");
    println!("  speak             read the current result aloud");
    println!("  stop              stop speaking");
    println!("  history           list past captures (newest first)");
    println!("  select <n>        bring a past capture back");
    println!("  clear-history     forget all past captures");
    println!("  set-key <key>     install a new API key");
    println!("  quit              exit");
}
