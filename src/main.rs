use std::path::PathBuf;

use chartist::ChartistError;
use chartist::analysis::config::AnalysisConfig;
use chartist::config::fetch_config;
use chartist::market::BinanceClient;
use chartist::models::{AnalysisRequest, Interval};
use chartist::pipeline::run_analysis;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Candlestick technical analysis for Binance USDⓈ-M perpetuals.
#[derive(Debug, Parser)]
#[command(name = "chartist", version, about)]
struct Args {
    /// Contract symbol, e.g. ETHUSDT
    #[arg(default_value = "BTCUSDT")]
    symbol: String,

    /// Kline interval (1m, 5m, 15m, 1h, 4h, 1d, ...)
    #[arg(default_value = "15m")]
    interval: Interval,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Path to a JSON file with analysis settings
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), ChartistError> {
    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chartist=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let app_config = fetch_config()?;
    let analysis_config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    tracing::debug!("{}", analysis_config.describe());

    let request = AnalysisRequest::new(&args.symbol, args.interval)?;
    let client = BinanceClient::new(&app_config.binance)?;

    let report = run_analysis(&client, &request, app_config.kline_limit, &analysis_config).await?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{report}");
    }
    Ok(())
}
