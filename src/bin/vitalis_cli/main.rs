// ABOUTME: Vitalis CLI - runs the health-metrics pipeline against local measurement files
// ABOUTME: Prepares payloads, reconciles inference output, runs analyses, lists KPIs, checks the endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Show the payload and KPI worklist that would be sent for inference
//! vitalis-cli prepare --file measurements.json
//!
//! # Reconcile a saved inference response against a KPI worklist
//! vitalis-cli reconcile --response reply.txt --kpis bmi_class,non_hdl_ratio
//!
//! # Run the full pipeline against the configured inference endpoint
//! VITALIS_LLM_BASE_URL=http://localhost:11434/v1 vitalis-cli analyze --file measurements.json
//!
//! # List KPIs, marking the ones a measurement file unlocks
//! vitalis-cli catalog --file measurements.json --category lipids
//!
//! # Check that the configured inference endpoint answers
//! vitalis-cli health
//! ```
//!
//! Results go to stdout; logs go to stderr.

mod commands;
mod helpers;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use uuid::Uuid;
use vitalis::logging::LoggingConfig;
use vitalis_intelligence::KpiCategory;

#[derive(Parser)]
#[command(
    name = "vitalis-cli",
    about = "Vitalis health-metrics pipeline CLI",
    long_about = "Builds inference payloads from measurement files, runs analyses against an OpenAI-compatible endpoint, and reconciles inference output."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Owner whose rows are read from an owner-keyed measurement file
    #[arg(long, global = true)]
    owner: Option<Uuid>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

/// Output rendering for commands with a text and a JSON form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Print the inference payload and KPI worklist for a measurement file
    Prepare {
        /// Measurement file (row array or owner-keyed map)
        #[arg(long)]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Reconcile a saved inference response into the canonical result
    Reconcile {
        /// File holding the raw inference response text
        #[arg(long)]
        response: PathBuf,

        /// Expected KPI ids (comma-separated)
        #[arg(long, value_delimiter = ',', conflicts_with = "file")]
        kpis: Vec<String>,

        /// Measurement file to derive the expected KPI worklist from
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Run the full pipeline against the configured inference endpoint
    Analyze {
        /// Measurement file (row array or owner-keyed map)
        #[arg(long)]
        file: PathBuf,

        /// Print only the reconciled result, without model and usage details
        #[arg(long)]
        result_only: bool,
    },

    /// List the KPI catalog, optionally marking eligibility for a measurement file
    Catalog {
        /// Measurement file to evaluate eligibility against
        #[arg(long)]
        file: Option<PathBuf>,

        /// Only list eligible KPIs (requires --file)
        #[arg(long, requires = "file")]
        eligible_only: bool,

        /// Only list KPIs of one category (e.g. lipids, body_composition)
        #[arg(long)]
        category: Option<KpiCategory>,
    },

    /// Check that the configured inference endpoint is reachable
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    logging.init()?;

    let owner = cli.owner.unwrap_or_else(Uuid::nil);
    debug!(%owner, "Vitalis CLI");

    match cli.command {
        Command::Prepare { file, format } => commands::prepare::run(&file, owner, format).await,
        Command::Reconcile {
            response,
            kpis,
            file,
        } => commands::reconcile::run(&response, kpis, file.as_deref(), owner).await,
        Command::Analyze { file, result_only } => {
            commands::analyze::run(file, owner, result_only).await
        }
        Command::Catalog {
            file,
            eligible_only,
            category,
        } => commands::catalog::run(file.as_deref(), owner, eligible_only, category).await,
        Command::Health => commands::health::run().await,
    }
}
