//! Tail command handler
//!
//! Streams log records to stdout until the server closes the connection or
//! the operator interrupts.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use opsconsole_client::{TailEvent, TailStream};
use opsconsole_core::domain::log::LogRecord;
use std::collections::HashSet;

use crate::config::Config;

#[derive(Args)]
pub struct TailArgs {
    /// Only show records from these processes (repeatable)
    #[arg(short, long = "process")]
    processes: Vec<String>,

    /// Print HTML-escaped lines
    #[arg(long)]
    html: bool,
}

pub async fn handle_tail_command(args: TailArgs, config: &Config) -> Result<()> {
    let client = config.client();
    let endpoint = config.tail_endpoint(&client)?;

    let mut tail = TailStream::open(&endpoint)
        .await
        .with_context(|| format!("Failed to connect to log tail at {}", endpoint))?;

    if !args.processes.is_empty() {
        let allowed: HashSet<String> = args.processes.into_iter().collect();
        tail.set_process_filter(Some(allowed));
    }

    loop {
        tokio::select! {
            event = tail.next_event() => match event {
                Some(TailEvent::Connected) => {
                    println!("{}", "==== CONNECTED ====".green().bold());
                }
                Some(TailEvent::Record(record)) => {
                    if args.html {
                        println!("{}", record.to_html_line());
                    } else {
                        print_record(&record);
                    }
                }
                Some(TailEvent::Disconnected { reason }) => {
                    println!("{} {}", "==== DISCONNECTED ====".red().bold(), reason.dimmed());
                    break;
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tail.close().await;
    Ok(())
}

fn print_record(record: &LogRecord) {
    if !record.is_structured() {
        println!("{}", record.message);
        return;
    }

    let message_type = match record.message_type.as_str() {
        "ERROR" | "CRITICAL" => record.message_type.red(),
        "WARNING" | "WARN" => record.message_type.yellow(),
        "DEBUG" => record.message_type.dimmed(),
        _ => record.message_type.cyan(),
    };

    println!(
        "{}\t{}\t{}\t{}",
        record.timestamp.dimmed(),
        record.process_name.bold(),
        message_type,
        record.message
    );
}
