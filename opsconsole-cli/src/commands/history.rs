//! History command handler
//!
//! Prints pages of the command history. In interactive mode the operator
//! pages with `n`/`p`, re-fetches with `r` and leaves with `q`.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::*;
use opsconsole_client::ConsoleClient;
use opsconsole_core::history::{HistoryPager, HistoryRow, PAGE_SIZE, PageRequest};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;

#[derive(Args)]
pub struct HistoryArgs {
    /// Offset of the first command to show
    #[arg(long, default_value = "0")]
    offset: u32,

    /// Commands per page
    #[arg(long, default_value_t = PAGE_SIZE)]
    page_size: u32,

    /// Page through the history from stdin
    #[arg(short, long)]
    interactive: bool,
}

pub async fn handle_history_command(args: HistoryArgs, config: &Config) -> Result<()> {
    if args.page_size == 0 {
        anyhow::bail!("page size must be greater than 0");
    }

    let client = config.client();
    let mut pager = HistoryPager::with_page_size(args.page_size).starting_at(args.offset);

    let request = pager.refresh();
    show_page(&client, &mut pager, request).await?;

    if !args.interactive {
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("{}", "[n]ext  [p]revious  [r]efresh  [q]uit".dimmed());

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        let request = match line.trim() {
            "n" | "next" => pager.next(),
            "p" | "prev" | "previous" => pager.previous(),
            "r" | "refresh" | "" => pager.refresh(),
            "q" | "quit" => return Ok(()),
            other => {
                println!("{}", format!("Unknown input '{}'", other).yellow());
                continue;
            }
        };

        show_page(&client, &mut pager, request).await?;
    }
}

/// Fetch the page for `request` and print it if it is still current
async fn show_page(
    client: &ConsoleClient,
    pager: &mut HistoryPager,
    request: PageRequest,
) -> Result<()> {
    let commands = client
        .list_commands(request.offset, request.num)
        .await
        .context("Failed to fetch command history")?;

    if !pager.apply(request, &commands) {
        return Ok(());
    }

    println!();
    let (first, last) = page_bounds(&request);
    println!("{}", format!("Commands {}-{}:", first, last).bold());

    if pager.rows().is_empty() {
        println!("{}", "No commands found.".yellow());
        return Ok(());
    }

    for row in pager.rows() {
        print_row(row);
    }
    Ok(())
}

/// 1-based positions of the first and last rows a request can return
fn page_bounds(request: &PageRequest) -> (u64, u64) {
    let offset = u64::from(request.offset);
    (offset + 1, offset + u64::from(request.num))
}

fn print_row(row: &HistoryRow) {
    let time = row
        .timestamp
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!(
        "  {} {:>4}  {}  {}",
        "▸".cyan(),
        row.index,
        time.dimmed(),
        row.command_type.bold()
    );
    println!("         Data:   {}", row.data_summary());
    println!("         Resend: {}", row.resend_link.dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        let request = PageRequest {
            offset: 10,
            num: PAGE_SIZE,
            generation: 1,
        };
        assert_eq!(page_bounds(&request), (11, 20));

        let request = PageRequest {
            offset: u32::MAX,
            num: PAGE_SIZE,
            generation: 1,
        };
        assert_eq!(
            page_bounds(&request),
            (u64::from(u32::MAX) + 1, u64::from(u32::MAX) + 10)
        );
    }
}
