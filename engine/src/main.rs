// stockviz entry point: collect inputs, fetch CSV data, compose the chart and
// write the render description as JSON.
use chrono::Local;
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;
use stockviz_engine::chart::ChartComposer;
use stockviz_engine::config::{ChartConfig, ChartKind, EngineSettings};
use stockviz_engine::data::CsvDirectoryProvider;
use stockviz_engine::pipeline::{build_chart, write_render_spec};
use stockviz_engine::request::{parse_date_range, parse_metrics, parse_tickers, AnalysisRequest};
use stockviz_engine::EngineError;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stockviz")]
#[command(about = "Compose price, moving average, trend and RSI charts from daily price data", long_about = None)]
struct Cli {
    /// Settings file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Comma-separated ticker symbols, e.g. "AAPL,MSFT"
    #[arg(short, long)]
    tickers: Option<String>,

    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    /// Last date to include (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end: Option<String>,

    /// Comma-separated metrics: Open, High, Low, Close, Volume
    #[arg(short, long, default_value = "Close")]
    metrics: String,

    #[arg(long, value_enum, default_value_t = ChartKind::Line)]
    chart: ChartKind,

    /// Moving average window in days, 0 to disable (max 100)
    #[arg(long, default_value_t = 0)]
    ma_window: usize,

    /// Overlay a least-squares trend line per metric
    #[arg(long)]
    regression: bool,

    /// Add the RSI panel
    #[arg(long)]
    rsi: bool,

    /// Directory of <TICKER>.csv files, overrides the settings file
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Write the chart JSON here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for the chart JSON.
    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), EngineError> {
    let settings = match &cli.config {
        Some(path) => EngineSettings::load(path)?,
        None => EngineSettings::default(),
    };

    let tickers = match &cli.tickers {
        Some(text) => parse_tickers(text),
        None => settings.default_tickers.clone(),
    };
    let metrics = parse_metrics(&cli.metrics)?;
    let range = parse_date_range(
        cli.start.as_deref(),
        cli.end.as_deref(),
        Local::now().date_naive(),
        settings.lookback_days,
    )?;

    let chart = ChartConfig::new(tickers, metrics)
        .with_kind(cli.chart)
        .with_moving_average(cli.ma_window)
        .with_regression(cli.regression)
        .with_oscillator(cli.rsi)
        .with_oscillator_window(settings.oscillator_window);
    let request = AnalysisRequest::new(range, chart)?;

    let data_dir = cli.data_dir.unwrap_or(settings.data_dir.clone());
    let provider = CsvDirectoryProvider::new(data_dir);
    let composer = ChartComposer::new(settings.palette()?);

    let spec = build_chart(&provider, &composer, &request).await?;

    match &cli.output {
        Some(path) => {
            write_render_spec(&spec, BufWriter::new(File::create(path)?))?;
            info!(path = %path.display(), traces = spec.len(), "Wrote chart");
        }
        None => write_render_spec(&spec, std::io::stdout().lock())?,
    }
    Ok(())
}
