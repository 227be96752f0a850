//! Command-line interface for eventmail.
//!
//! Provides commands for answering a single email-style query and for
//! inspecting the resolved configuration.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::core::Orchestrator;
use crate::service::{ReplyRequest, ReplyService};

/// eventmail - Email-style replies about recent local events
#[derive(Parser, Debug)]
#[command(name = "eventmail")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to .eventmail/config.yaml discovery)
    #[arg(short, long, global = true, env = "EVENTMAIL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer one query and print the JSON response
    Reply {
        /// Email body (reads from stdin if not provided)
        #[arg(short, long)]
        body: Option<String>,

        /// Email subject
        #[arg(short, long)]
        subject: Option<String>,

        /// Sender email address
        #[arg(long)]
        sender: Option<String>,

        /// Correlation id (a UUID is generated if omitted)
        #[arg(long)]
        request_id: Option<String>,
    },

    /// Show resolved configuration (secrets redacted)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Reply {
                body,
                subject,
                sender,
                request_id,
            } => {
                reply(&settings, body, subject, sender, request_id).await
            }
            Commands::Config => {
                show_config(&settings)
            }
        }
    }
}

/// Run the pipeline for one request
async fn reply(
    settings: &Settings,
    body: Option<String>,
    subject: Option<String>,
    sender_email: Option<String>,
    request_id: Option<String>,
) -> Result<()> {
    let body = match body {
        Some(body) => body,
        None if !io::stdin().is_terminal() => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        }
        None => anyhow::bail!("No body provided. Use --body <text> or pipe to stdin"),
    };

    let orchestrator = Orchestrator::from_settings(settings)?;
    let service = ReplyService::new(
        Arc::new(orchestrator),
        settings.location.clone(),
        settings.reply,
    );

    let request = ReplyRequest {
        sender_email,
        subject,
        body,
    };

    match service.reply(request, request_id).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(error) => {
            println!("{}", serde_json::to_string_pretty(&error)?);
            std::process::exit(1);
        }
    }
}

/// Show resolved configuration
fn show_config(settings: &Settings) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
    Ok(())
}
