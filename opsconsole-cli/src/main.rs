//! opsconsole CLI
//!
//! Command-line operator console: command history and submission, process
//! status and control, and the live log tail.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "opsconsole")]
#[command(about = "Operator console for commands, process status and logs", long_about = None)]
struct Cli {
    /// Backend URL
    #[arg(long, env = "OPSCONSOLE_URL", default_value = "http://localhost:5001")]
    url: String,

    /// Log tail WebSocket URL (derived from --url when omitted)
    #[arg(long, env = "OPSCONSOLE_TAIL_URL")]
    tail_url: Option<String>,

    /// Status refresh interval in milliseconds for `status --watch`
    #[arg(long, default_value = "1000")]
    poll_interval_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so tables and tailed lines stay clean on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opsconsole_cli=info,opsconsole_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        base_url: cli.url,
        tail_url: cli.tail_url,
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
    };
    config.validate()?;
    debug!(url = %config.base_url, "Using backend");

    handle_command(cli.command, &config).await
}
