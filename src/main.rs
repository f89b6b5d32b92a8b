//! Snowcap - command-line client for the ServiceNow table API
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `SNOW_BASE_URL`: Base URL of the table API
//! - `SNOW_USERNAME`: Basic-auth user
//! - `password`: Basic-auth password
//!
//! # Usage
//!
//! ```bash
//! # Two active P5 incidents that are unassigned
//! snowcap records --query 'priority=5^state=1^assignment_group=NULL' --limit 2
//!
//! # Create every incident listed in a JSON array
//! snowcap create-batch incidents.json
//! cat incidents.json | snowcap create-batch -
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use snowcap::client::{RecordQuery, TableClient};
use snowcap::config::{self, Config};
use snowcap::models::IncidentSpec;

#[derive(Debug, Parser)]
#[command(
    name = "snowcap",
    version,
    about = "Read records and create incidents through the ServiceNow table API"
)]
struct Cli {
    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read records from a table and print the raw response.
    Records {
        /// Table to read from.
        #[arg(long, default_value = config::INCIDENT_TABLE)]
        table: String,

        /// Encoded query (sysparm_query), e.g. 'priority=1^active=true'.
        #[arg(long)]
        query: Option<String>,

        /// Maximum number of records (defaults to SNOW_DEFAULT_LIMIT or 10).
        #[arg(long)]
        limit: Option<u32>,

        /// Comma-separated columns to return (sysparm_fields).
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Create incidents from a JSON array and print a per-item report.
    CreateBatch {
        /// File holding the JSON array, or '-' for stdin.
        #[arg(default_value = "-")]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries only JSON output
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snowcap=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    let client = TableClient::new(&config).context("Failed to create table client")?;
    let secret = config.password().unwrap_or("");

    match cli.command {
        Command::Records {
            table,
            query,
            limit,
            fields,
        } => {
            let mut params = RecordQuery::new(table).with_fields(fields);
            if let Some(query) = query {
                params = params.with_filter(query);
            }
            if let Some(limit) = limit {
                params = params.with_limit(limit);
            }

            // Errors on the read path are fatal
            let records = client
                .query(params)
                .await
                .map_err(|e| anyhow::anyhow!(e.sanitized_display(secret)))
                .context("Failed to read records")?;

            print_json(&records, cli.compact)?;
        }
        Command::CreateBatch { input } => {
            let incidents = read_incidents(&input)?;

            if !incidents.is_empty() {
                if let Err(e) = client.test_connection().await {
                    tracing::warn!(
                        error = %e.sanitized_display(secret),
                        "Connection test failed, submitting anyway"
                    );
                }
            }

            let report = client.create_multiple_incidents(&incidents).await;

            // Partial failure is reported, not treated as a process error
            print_json(&report, cli.compact)?;
        }
    }

    Ok(())
}

fn read_incidents(input: &Path) -> Result<Vec<IncidentSpec>> {
    let raw = if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read incidents from stdin")?;
        buf
    } else {
        fs::read_to_string(input)
            .with_context(|| format!("Failed to read incidents from {}", input.display()))?
    };

    serde_json::from_str(&raw).context(
        "Incident list must be a JSON array of {short_description, caller_id, assignment_group}",
    )
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", out);
    Ok(())
}
