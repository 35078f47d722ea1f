use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jobpulse::api::{create_router, AppState};
use jobpulse::config::Settings;

/// Jobpulse - real-time notification hub for the job marketplace backend.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Override the config file path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the bind address, e.g. 0.0.0.0:8090
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
    /// Reduce output to only errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let settings = Settings::load(cli.config.as_deref())?;
    let bind_addr = cli.bind.clone().unwrap_or_else(|| settings.bind_addr());

    let state = AppState::new();
    let app = create_router(state, &settings.cors_origins);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    info!("jobpulse listening on {bind_addr}");

    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
