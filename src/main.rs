//! CLI entry point for the incident statistics pipeline.
//!
//! Runs the whole batch in order: fetch the dataset, parse it, normalize the
//! records, write the three grouped summaries, and fit the murder-flag
//! logistic regression. Any failure aborts the run.

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use incident_stats::aggregate::{count_by_borough, count_by_hour, count_by_year};
use incident_stats::fetch::{BasicClient, read_source};
use incident_stats::loader::parse_table;
use incident_stats::model::fit_murder_model;
use incident_stats::output::{
    print_model_summary, write_borough_counts, write_hour_counts, write_model_summary,
    write_year_counts,
};
use incident_stats::schema::normalize;

/// Public NYC shooting incident dataset (historic extract).
const DEFAULT_SOURCE: &str =
    "https://data.cityofnewyork.us/api/views/833y-fsy8/rows.csv?accessType=DOWNLOAD";

#[derive(Parser)]
#[command(name = "incident_stats")]
#[command(about = "Summarize a public incident dataset and fit an exploratory model", long_about = None)]
struct Cli {
    /// URL or local path of the dataset CSV. Falls back to the SOURCE_URL
    /// environment variable, then to the documented public endpoint.
    #[arg(short, long)]
    source: Option<String>,

    /// Directory the summary tables and model summary are written to
    #[arg(short, long, default_value = "out")]
    output_dir: String,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/incident_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("incident_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let source = cli
        .source
        .or_else(|| std::env::var("SOURCE_URL").ok())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    run(&source, &cli.output_dir, cli.timeout_secs).await
}

#[tracing::instrument(skip_all)]
async fn run(source: &str, output_dir: &str, timeout_secs: u64) -> Result<()> {
    let client = BasicClient::with_timeout(Duration::from_secs(timeout_secs));

    info!(source, "Loading dataset");
    let bytes = read_source(&client, source).await?;
    let table = parse_table(&bytes)?;
    info!(
        rows = table.len(),
        columns = table.headers.len(),
        "Dataset parsed"
    );

    let data = normalize(&table)?;
    info!(
        records = data.incidents.len(),
        boroughs = data.vocab.borough.len(),
        "Records normalized"
    );

    std::fs::create_dir_all(output_dir)?;
    let out = Path::new(output_dir);

    let years = count_by_year(&data.incidents);
    write_year_counts(&out.join("counts_by_year.csv"), &years)?;
    info!(groups = years.len(), "Year summary written");

    let boroughs = count_by_borough(&data.incidents, &data.vocab.borough);
    write_borough_counts(&out.join("counts_by_borough.csv"), &boroughs)?;
    info!(groups = boroughs.len(), "Borough summary written");

    let hours = count_by_hour(&data.incidents);
    write_hour_counts(&out.join("counts_by_hour.csv"), &hours)?;
    info!(groups = hours.len(), "Hour summary written");

    let summary = fit_murder_model(&data.incidents, &data.vocab.borough)?;
    print_model_summary(&summary);
    write_model_summary(&out.join("model_summary.json"), &summary)?;

    info!(output_dir, "Run complete");
    Ok(())
}
