//! Augmenter - input mirroring and conversation search for a chat page.
//!
//! Main entry point for the observer and presentation processes.

mod cli;
mod cmd_observe;
mod cmd_popup;
mod cmd_service;

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use augmenter_config::{Config, ConfigLoader, ConfigValidator};

use cli::{Cli, Commands};

/// Get the Augmenter home directory (~/.augmenter).
fn augmenter_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".augmenter")
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = augmenter_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("augmenter")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the background writer alive for the whole process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn load_config(path: &std::path::Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(path)?;
    let warnings = ConfigValidator::validate(&config)?.into_result()?;
    for warning in warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    info!("Configuration loaded from {}", path.display());
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Observe { page, no_server } => {
            cmd_observe::run_observer(&config, &page, no_server).await
        }
        Commands::Popup => cmd_popup::run_popup(&config).await,
        Commands::Status { json } => cmd_popup::show_status(&config, json).await,
        Commands::Refresh => cmd_popup::refresh_once(&config).await,
        Commands::Search { query, top_k } => cmd_service::search(&config, query, top_k).await,
        Commands::Upload { file } => cmd_service::upload(&config, &file).await,
        Commands::Forget => cmd_service::forget(&config).await,
        Commands::Health => cmd_service::health(&config).await,
    }
}
