//! Command form handlers
//!
//! `schema` shows the form generated for each command type; `send` fills
//! one in from `-f id=value` pairs and submits it.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use opsconsole_client::FormSession;
use opsconsole_core::form::{CommandForm, CommandTab, ControlKind, FormControl, FormError};

use crate::config::Config;

#[derive(Args)]
pub struct SchemaArgs {
    /// Pre-fill the form from a recorded command
    #[arg(long)]
    key: Option<String>,

    /// Print the form as HTML instead of a summary
    #[arg(long)]
    html: bool,
}

#[derive(Args)]
pub struct SendArgs {
    /// Command type to submit; defaults to the type of `--key`
    command_type: Option<String>,

    /// Start from a recorded command (resend)
    #[arg(long)]
    key: Option<String>,

    /// Field values (format: id=value)
    #[arg(short = 'f', long = "field", value_parser = parse_key_val)]
    fields: Vec<(String, String)>,

    /// Print the request body instead of submitting it
    #[arg(long)]
    dry_run: bool,
}

pub async fn handle_schema_command(args: SchemaArgs, config: &Config) -> Result<()> {
    let client = config.client();
    let session = FormSession::load(&client, args.key.as_deref())
        .await
        .context("Failed to load command schema")?;
    let form = session.form();

    if args.html {
        println!("{}", form.to_html());
        return Ok(());
    }

    print_form(form);
    Ok(())
}

pub async fn handle_send_command(args: SendArgs, config: &Config) -> Result<()> {
    let client = config.client();
    let mut session = FormSession::load(&client, args.key.as_deref())
        .await
        .context("Failed to load command schema")?;

    if let Some(command_type) = &args.command_type {
        session.form_mut().activate(command_type)?;
    }

    let tab = session.form_mut().active_tab_mut()?;
    let command_type = tab.command_type().to_string();

    for (id, value) in &args.fields {
        tab.set_input(id, value)?;
    }

    let missing = tab.missing_required();
    if !missing.is_empty() {
        print_tab(tab, true);
        return Err(FormError::MissingRequired(missing).into());
    }

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&tab.serialize())?);
        return Ok(());
    }

    let ack = session
        .submit(&command_type, &client)
        .await
        .with_context(|| format!("Failed to submit {}", command_type))?;

    println!("{}", "✓ Command submitted".green().bold());
    match ack.command {
        Some(command) => {
            println!("  Type: {}", command.command_type.bold());
            println!("  Key:  {}", command.key);
        }
        None => println!("  Type: {}", command_type.bold()),
    }

    Ok(())
}

/// Print every tab of the form, marking the active one
fn print_form(form: &CommandForm) {
    if form.tabs().is_empty() {
        println!("{}", "No command types found.".yellow());
        return;
    }

    println!(
        "{}",
        format!("Found {} command type(s):", form.tabs().len()).bold()
    );
    println!();

    for tab in form.tabs() {
        print_tab(tab, form.active_type() == Some(tab.command_type()));
    }
}

fn print_tab(tab: &CommandTab, active: bool) {
    let marker = if active { "▸".green() } else { "▸".cyan() };
    println!("  {} {}", marker, tab.command_type().bold());

    if tab.controls().is_empty() {
        println!("    {}", "(no fields)".dimmed());
    }
    for control in tab.controls() {
        print_control(control);
    }
    println!();
}

fn print_control(control: &FormControl) {
    let description = match &control.kind {
        ControlKind::Select { options, selected } => {
            format!("{} of [{}]", selected.bold(), options.join(", "))
        }
        ControlKind::Checkbox { checked: true } => "[x]".to_string(),
        ControlKind::Checkbox { checked: false } => "[ ]".to_string(),
        ControlKind::Text {
            value,
            placeholder,
            required,
        } => {
            let shown = if value.is_empty() {
                placeholder.as_deref().unwrap_or("").dimmed().to_string()
            } else {
                value.clone()
            };
            if *required && value.is_empty() {
                format!("{} {}", shown, "(required)".red())
            } else {
                shown
            }
        }
    };

    println!(
        "    {:<20} {:<12} {}",
        control.field_id,
        control.hint.dimmed(),
        description
    );
}

/// Parse a single id=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid id=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("target=host-a").unwrap(),
            ("target".to_string(), "host-a".to_string())
        );
        assert_eq!(
            parse_key_val("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_val("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_key_val("novalue").is_err());
    }
}
