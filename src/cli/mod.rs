//! Command-line parsing for the return-rate analytics tool.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the statistics/modeling code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::GroupKey;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ra", version, about = "E-commerce return-rate analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline: aggregation, chi-square test, logistic
    /// regression, and optional exports.
    Analyze(AnalyzeArgs),
    /// Print one grouped return-rate table (useful for scripting).
    Rates(RatesArgs),
    /// Print the 30-entry rolling return-rate trend.
    Trend(TrendArgs),
    /// Generate a synthetic orders CSV for demos and smoke tests.
    Sample(SampleArgs),
}

/// Data source plus the three optional exact-match view filters.
#[derive(Debug, Parser, Clone)]
pub struct DataArgs {
    /// Path to the orders CSV.
    #[arg(long, value_name = "CSV")]
    pub data: PathBuf,

    /// Keep only orders with this exact category.
    #[arg(long)]
    pub category: Option<String>,

    /// Keep only orders with this exact region.
    #[arg(long)]
    pub region: Option<String>,

    /// Keep only orders with this exact seller id.
    #[arg(long)]
    pub seller: Option<String>,
}

/// Options for the full analysis run.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Output directory for exports; omit to skip persistence.
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Also print the rolling trend series.
    #[arg(long)]
    pub trend: bool,
}

/// Options for the grouped-rates command.
#[derive(Debug, Parser)]
pub struct RatesArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Which field to group by.
    #[arg(long, value_enum, default_value_t = GroupKey::Category)]
    pub by: GroupKey,
}

/// Options for the rolling-trend command.
#[derive(Debug, Parser)]
pub struct TrendArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

/// Options for synthetic data generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Where to write the generated CSV.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Number of order rows to generate.
    #[arg(long, default_value_t = 5000)]
    pub rows: usize,

    /// Random seed (generation is deterministic per seed).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First order date (YYYY-MM-DD).
    #[arg(long, default_value = "2024-01-01")]
    pub start_date: NaiveDate,

    /// Number of calendar days orders are spread over.
    #[arg(long, default_value_t = 365)]
    pub days: u64,
}
