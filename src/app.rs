//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - loads the dataset or fixture store
//! - runs the summary pipeline
//! - prints reports and writes charts/fixtures

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, RecordArgs, SummarizeArgs, VerifyArgs};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::io::fixture::FixtureStore;
use crate::io::ingest::load_dataset;
use crate::plot::PngRenderer;

pub mod pipeline;

use pipeline::ChartTarget;

const DEFAULT_LOG_FILTER: &str = "covid_summary=info";

/// Entry point for the `covid-summary` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may provide COVID_CSV and RUST_LOG, so it is read before parsing.
    dotenvy::dotenv().ok();
    init_logging();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Summarize(args) => handle_summarize(&run_config_from_args(&args)),
        Command::Verify(args) => handle_verify(args),
        Command::Record(args) => handle_record(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // Logs go to stderr so stdout stays clean for the reports.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_summarize(config: &RunConfig) -> Result<(), AppError> {
    let records = load_dataset(&config.csv_path)?;
    info!(records = records.len(), path = %config.csv_path.display(), "loaded dataset");

    let renderer = PngRenderer::default();
    let charts = config.charts.then_some(ChartTarget {
        renderer: &renderer,
        out_dir: &config.out_dir,
    });
    let output = pipeline::run_summary(&records, &config.histogram_key, charts)?;

    println!("{}", crate::report::format_summary(&output));
    if config.plot {
        println!(
            "{}",
            crate::plot::ascii::render_time_series(&output.over_time, config.plot_width, config.plot_height)
        );
    }
    Ok(())
}

fn handle_verify(args: VerifyArgs) -> Result<(), AppError> {
    let store = FixtureStore::open(&args.fixtures)?;

    let renderer = PngRenderer::default();
    let charts = args.out_dir.as_deref().map(|out_dir| ChartTarget {
        renderer: &renderer,
        out_dir,
    });
    let (_, checks) = pipeline::verify_store(&store, args.state.as_deref(), charts)?;

    print!("{}", crate::report::format_verification(&checks));

    let failed = checks.iter().filter(|c| !c.outcome.is_equal()).count();
    if failed > 0 {
        return Err(AppError::new(
            5,
            format!("{failed} of {} views differ from '{}'.", checks.len(), args.fixtures.display()),
        ));
    }
    Ok(())
}

fn handle_record(args: RecordArgs) -> Result<(), AppError> {
    let records = load_dataset(&args.csv)?;
    let store = pipeline::record_fixtures(&records, &args.state)?;
    store.save(&args.fixtures)?;
    info!(path = %args.fixtures.display(), records = records.len(), "wrote fixture store");
    Ok(())
}

pub fn run_config_from_args(args: &SummarizeArgs) -> RunConfig {
    RunConfig {
        csv_path: args.csv.clone(),
        histogram_key: args.state.clone(),
        out_dir: args.out_dir.clone(),
        charts: !args.no_charts,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
    }
}
