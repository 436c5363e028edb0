/// Vesna Assistant - voice playback skills on the console
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vesna_assistant::{
    build_assistant, check, AssistantConfig, ConsoleBackendFactory, ConsoleSpeech,
};
use vesna_core::JsonOptionsStore;
use vesna_skills::Dispatch;

#[derive(Parser)]
#[command(name = "vesna-assistant")]
#[command(about = "Vesna radio and music skills driven by typed phrases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read phrases from stdin, one per line, and dispatch them
    Run {
        /// Configuration file path
        #[arg(short, long, env = "VESNA_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Validate configuration and stored skill options
    Check {
        /// Configuration file path
        #[arg(short, long, env = "VESNA_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "vesna_assistant=info,vesna_skills=info,vesna_playback=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            run(load_config(config)?).await?;
        }
        Commands::Check { config } => {
            check_setup(&load_config(config)?)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<AssistantConfig> {
    let config = AssistantConfig::load(path.as_deref())?;
    config.validate()?;
    Ok(config)
}

async fn run(config: AssistantConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Vesna assistant");
    tracing::info!("Options directory: {}", config.options_dir.display());
    tracing::info!("Skills: {:?}", config.skills);

    let store = Arc::new(JsonOptionsStore::new(config.options_dir.clone()));
    let mut assistant = build_assistant(
        &config,
        store,
        Arc::new(ConsoleBackendFactory),
        Arc::new(ConsoleSpeech),
        Handle::current(),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("Input closed");
                    break;
                };
                match assistant.handle_phrase(&line) {
                    Dispatch::Unrecognized => tracing::info!(phrase = %line, "Not recognized"),
                    dispatch => tracing::debug!(?dispatch, "Phrase handled"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    Ok(())
}

fn check_setup(config: &AssistantConfig) -> anyhow::Result<()> {
    for report in check(config)? {
        println!(
            "{:?}: {} tracks ({})",
            report.kind,
            report.tracks,
            if report.stored {
                "stored options"
            } else {
                "defaults"
            }
        );
    }
    Ok(())
}
