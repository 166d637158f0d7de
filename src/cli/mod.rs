//! Command-line parsing for the COVID death summary tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! aggregation and comparison code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::DEFAULT_HISTOGRAM_KEY;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "covid-summary",
    version,
    about = "COVID-19 death summaries: totals by state, trends over time, daily frequency"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate a CSV export, print the three views, and write PNG charts.
    Summarize(SummarizeArgs),
    /// Re-run the views on a fixture store's dataset and compare with its stored tables.
    Verify(VerifyArgs),
    /// Compute the views from a CSV export and save them as a fixture store.
    Record(RecordArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct SummarizeArgs {
    /// CSV with `state`, `submission_date` and `new_death` columns.
    #[arg(long, env = "COVID_CSV", value_name = "CSV")]
    pub csv: PathBuf,

    /// State whose daily death frequency is histogrammed.
    #[arg(long, default_value = DEFAULT_HISTOGRAM_KEY)]
    pub state: String,

    /// Directory for the PNG charts.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Skip writing PNG charts.
    #[arg(long)]
    pub no_charts: bool,

    /// Also print an ASCII trend plot.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct VerifyArgs {
    /// Fixture store (JSON) holding the dataset and expected tables.
    #[arg(long, value_name = "JSON")]
    pub fixtures: PathBuf,

    /// State whose daily death frequency is histogrammed. Defaults to the
    /// state recorded in the fixture store; a different state is rejected.
    #[arg(long)]
    pub state: Option<String>,

    /// Also write PNG charts into this directory.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct RecordArgs {
    /// CSV with `state`, `submission_date` and `new_death` columns.
    #[arg(long, env = "COVID_CSV", value_name = "CSV")]
    pub csv: PathBuf,

    /// Fixture store (JSON) to write.
    #[arg(long, value_name = "JSON")]
    pub fixtures: PathBuf,

    /// State whose daily death frequency is histogrammed.
    #[arg(long, default_value = DEFAULT_HISTOGRAM_KEY)]
    pub state: String,
}
