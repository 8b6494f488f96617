//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod history;
mod send;
mod status;
mod tail;

pub use history::HistoryArgs;
pub use send::{SchemaArgs, SendArgs};
pub use status::{ControlArgs, StatusArgs};
pub use tail::TailArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Browse the command history
    History(HistoryArgs),
    /// Show the command types and their form controls
    Schema(SchemaArgs),
    /// Fill in and submit a command
    Send(SendArgs),
    /// Show process status
    Status(StatusArgs),
    /// Start, stop, restart or update a process
    Control(ControlArgs),
    /// Follow the live log stream
    Tail(TailArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::History(args) => history::handle_history_command(args, config).await,
        Commands::Schema(args) => send::handle_schema_command(args, config).await,
        Commands::Send(args) => send::handle_send_command(args, config).await,
        Commands::Status(args) => status::handle_status_command(args, config).await,
        Commands::Control(args) => status::handle_control_command(args, config).await,
        Commands::Tail(args) => tail::handle_tail_command(args, config).await,
    }
}
