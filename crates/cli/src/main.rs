//! YARN stats CLI
//!
//! A command-line tool for running the YARN check once against a
//! ResourceManager and for inspecting its applications grouped by queue,
//! application type, user or submit type.

mod commands;
mod config;
mod output;

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use commands::{apps, collect};

/// YARN stats CLI
#[derive(Parser)]
#[command(name = "yarn-stats")]
#[command(author, version, about = "CLI for YARN ResourceManager application metrics", long_about = None)]
pub struct Cli {
    /// ResourceManager address, e.g. rm.example.com:8088
    #[arg(long, env = "YARN_RESOURCEMANAGER_URI")]
    pub resourcemanager_uri: Option<String>,

    /// Regular expression matching users whose applications are interactive
    #[arg(long, env = "YARN_USER_PATTERN")]
    pub user_pattern: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the check once and show every gauge and event it emitted
    Collect {
        /// Evaluate as if the clock read this RFC 3339 time
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<FixedOffset>>,
    },

    /// Show applications grouped into buckets
    Apps {
        /// Grouping dimension
        #[arg(long, default_value = "queue")]
        by: apps::GroupBy,

        /// Show applications completed in the last hour with this status
        #[arg(long)]
        status: Option<apps::StatusFilter>,
    },
}

fn parse_time(value: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let instance = config::Config::load()?.instance(
        cli.resourcemanager_uri,
        cli.user_pattern,
        cli.timeout,
    )?;

    // Execute command
    match cli.command {
        Commands::Collect { at } => {
            collect::run_collect(instance, at, cli.format).await?;
        }
        Commands::Apps { by, status } => {
            apps::show_apps(instance, by, status, cli.format).await?;
        }
    }

    Ok(())
}
