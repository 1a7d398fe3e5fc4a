// funnelwatch/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use funnelwatch_core::domain::funnel::MetricCategory;

#[derive(Parser)]
#[command(name = "funnelwatch")]
#[command(about = "Daily funnel snapshots and trailing-window funnel reports", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 📥 Collects one day of analytics and stores it as a snapshot
    Collect {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Day to collect (YYYY-MM-DD). Defaults to yesterday.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// 📊 Aggregates a trailing window and writes the funnel report
    Analyze {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Last day of the window (YYYY-MM-DD). Defaults to yesterday.
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Window length in days
        #[arg(long, default_value = "7")]
        days: u32,

        /// Hand the summary to the outbox
        #[arg(long)]
        deliver: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// 🗂️ Lists stored date partitions and their categories
    Status {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🔍 Prints one stored snapshot record
    Show {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Snapshot day (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// stages | goals | traffic_sources | pages
        #[arg(long, short)]
        category: MetricCategory,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
