//! Process status handlers
//!
//! Shows the status table once or keeps it refreshed, and runs lifecycle
//! actions against a process.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::*;
use opsconsole_client::StatusPoller;
use opsconsole_core::domain::status::{ProcessAction, ProcessHealth, ProcessStatus};
use std::sync::Arc;

use crate::config::Config;

#[derive(Args)]
pub struct StatusArgs {
    /// Keep refreshing until interrupted
    #[arg(short, long)]
    watch: bool,
}

#[derive(Args)]
pub struct ControlArgs {
    /// Action to run (start, stop, restart, update)
    action: ProcessAction,

    /// Process name
    process: String,
}

pub async fn handle_status_command(args: StatusArgs, config: &Config) -> Result<()> {
    let client = config.client();

    if !args.watch {
        let statuses = client.list_statuses().await?;
        print_statuses(&statuses);
        return Ok(());
    }

    let mut feed = StatusPoller::new(Arc::new(client))
        .with_interval(config.poll_interval)
        .spawn();

    loop {
        tokio::select! {
            snapshot = feed.next_snapshot() => match snapshot {
                Some(statuses) => {
                    // Each snapshot replaces the previous one on screen
                    print!("\x1B[2J\x1B[H");
                    println!(
                        "{}",
                        format!("Updated {}", Local::now().format("%H:%M:%S")).dimmed()
                    );
                    print_statuses(&statuses);
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    feed.stop();
    Ok(())
}

pub async fn handle_control_command(args: ControlArgs, config: &Config) -> Result<()> {
    let client = config.client();

    let statuses = client.list_statuses().await?;
    if let Some(status) = statuses.iter().find(|s| s.process_name == args.process) {
        if !status.actions_enabled() {
            anyhow::bail!(
                "process '{}' has no deploy target configured",
                args.process
            );
        }
    }

    let outcome = client
        .control_process(&args.process, args.action)
        .await
        .with_context(|| format!("Failed to {} {}", args.action, args.process))?;

    if outcome.success == Some(false) {
        println!(
            "{}",
            format!("✗ {} {} failed", args.action, args.process).red().bold()
        );
    } else {
        println!(
            "{}",
            format!("✓ {} {}", args.action, args.process).green().bold()
        );
    }

    if !outcome.stdout.is_empty() {
        println!("{}", "stdout:".bold());
        println!("{}", outcome.stdout.trim_end());
    }
    if !outcome.stderr.is_empty() {
        println!("{}", "stderr:".bold());
        println!("{}", outcome.stderr.trim_end().red());
    }

    Ok(())
}

fn print_statuses(statuses: &[ProcessStatus]) {
    if statuses.is_empty() {
        println!("{}", "No processes found.".yellow());
        return;
    }

    println!(
        "{}",
        format!("Found {} process(es):", statuses.len()).bold()
    );
    println!();
    for status in statuses {
        print_status(status);
    }
}

fn print_status(status: &ProcessStatus) {
    let actions = ProcessAction::TABLE_ACTIONS
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join(" | ");
    let actions = if status.actions_enabled() {
        actions.normal()
    } else {
        actions.dimmed()
    };

    println!("  {} {}", "▸".cyan(), status.process_name.bold());
    println!("    Status:       {}", colorize_health(status.health()));
    println!("    Heartbeat:    {}", status.heartbeat_display().dimmed());
    println!(
        "    Started:      {}",
        status
            .last_started_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!("    Git SHA:      {}", status.git_sha);
    println!("    Actions:      {}", actions);
    println!();
}

/// Colorize process health for display
fn colorize_health(health: ProcessHealth) -> ColoredString {
    let health_str = health.to_string();
    match health {
        ProcessHealth::Up => health_str.green(),
        ProcessHealth::Restarting => health_str.yellow(),
        ProcessHealth::Down => health_str.red(),
    }
}
