mod adapters;
mod app;
mod core;
mod global_constants;
mod ports;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "whisperlens")]
#[command(about = "WhisperLens - point it at a picture, hear what it sees")]
#[command(version)]
struct Cli {
    /// Gemini API key; overrides any previously stored key
    #[arg(long, env = global_constants::API_KEY_ENV_VAR, hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one image file and print the result
    Analyze {
        /// Path to the image to analyze
        image: String,
        /// Read the result aloud after printing it
        #[arg(long)]
        speak: bool,
    },
    /// List retained past captures, newest first
    History,
    /// Forget all retained captures
    ClearHistory,
    /// Interactive capture session (the default)
    Session,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    log::info!("[MAIN] Starting WhisperLens application");

    let cli = Cli::parse();
    let mut app = app::WhisperApp::build(cli.api_key)?;

    match cli.command {
        Some(Commands::Analyze { image, speak }) => app.analyze_once(&image, speak).await,
        Some(Commands::History) => {
            app.print_history();
            Ok(())
        }
        Some(Commands::ClearHistory) => {
            app.clear_history();
            Ok(())
        }
        Some(Commands::Session) | None => app.run_interactive().await,
    }
}
