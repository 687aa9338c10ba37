//! athena-query: run one SQL statement through Athena and print the rows.
//!
//! Connection settings come from `ATHENA_*` env vars (profile-aware, see
//! `AthenaConfig`); flags override them.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tracing::info;

use lakequery_athena::{AthenaClient, AthenaConfig, QueryOptions, DEFAULT_DESCRIPTION};
use lakequery_core::{load_dotenv, profile_label, render_table};

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Run a SQL statement against AWS Athena.
#[derive(Parser, Debug)]
#[command(name = "athena-query", version, about)]
struct Cli {
    /// SQL text to run.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    sql: Option<String>,

    /// Read the SQL text from a file.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Database to run against (defaults to ATHENA_DATABASE).
    #[arg(long)]
    database: Option<String>,

    /// S3 location for query results (defaults to ATHENA_OUTPUT_LOCATION).
    #[arg(long)]
    output_location: Option<String>,

    /// Label used in logs.
    #[arg(long, default_value = DEFAULT_DESCRIPTION)]
    description: String,

    /// Run to completion without fetching rows (DDL).
    #[arg(long)]
    execute: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[arg(long)]
    backoff_ms: Option<u64>,

    #[arg(long)]
    max_retries: Option<u32>,

    #[arg(long)]
    poll_interval_ms: Option<u64>,

    #[arg(long)]
    max_poll_attempts: Option<u32>,
}

impl Cli {
    fn query_options(&self) -> QueryOptions {
        QueryOptions {
            backoff_ms: self.backoff_ms,
            max_retries: self.max_retries,
            poll_interval_ms: self.poll_interval_ms,
            max_poll_attempts: self.max_poll_attempts,
        }
    }

    fn sql_text(&self) -> anyhow::Result<String> {
        let sql = match (&self.sql, &self.file) {
            (Some(sql), _) => sql.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("reading SQL from {}", path.display()))?,
            (None, None) => bail!("either --sql or --file is required"),
        };
        if sql.trim().is_empty() {
            bail!("SQL text is empty");
        }
        Ok(sql)
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let sql = cli.sql_text()?;

    let mut config = AthenaConfig::from_env();
    if let Some(loc) = &cli.output_location {
        config.output_location = loc.clone();
    }
    let database = cli.database.clone().unwrap_or_else(|| config.database.clone());

    info!(
        profile = profile_label(&lakequery_core::active_profile()),
        region = %config.region,
        database = %database,
        "athena-query starting"
    );

    let client = AthenaClient::from_config(&config).await?;
    let opts = cli.query_options();

    if cli.execute {
        let query_id = client
            .execute(&sql, &database, &cli.description, &opts)
            .await?;
        println!("{query_id}");
        return Ok(());
    }

    let records = client
        .query(&sql, &database, &cli.description, &opts)
        .await?;

    match cli.format {
        OutputFormat::Table => println!("{}", render_table(&records)),
        OutputFormat::Json => {
            for record in &records {
                println!("{}", serde_json::to_string(record)?);
            }
        }
    }

    Ok(())
}
