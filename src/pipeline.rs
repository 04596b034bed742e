//! One analysis run: fetch, validate, analyse.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::analysis::config::AnalysisConfig;
use crate::analysis::{self, AnalysisInputs};
use crate::config::MIN_KLINE_LIMIT;
use crate::market::MarketDataSource;
use crate::models::{AnalysisRequest, Interval};
use crate::report::AnalysisReport;
use crate::{ChartistError, Result};

/// Daily candles fetched for pivots: the previous session and today.
const DAILY_CANDLES: usize = 2;

/// Fetches market data for `request` and runs the analysis.
///
/// The four fetches run concurrently. A failed funding-rate fetch degrades
/// to a neutral `0`; every other failure aborts the run.
///
/// # Errors
///
/// Propagates fetch errors and returns
/// [`ChartistError::InsufficientData`] when the source returns fewer than
/// the minimum candles.
pub async fn run_analysis<S: MarketDataSource>(
    source: &S,
    request: &AnalysisRequest,
    kline_limit: usize,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    let symbol = request.symbol.as_str();
    info!(symbol, interval = %request.interval, kline_limit, "Fetching market data");

    let (candles, daily, funding, change) = tokio::join!(
        source.candles(symbol, request.interval, kline_limit),
        source.candles(symbol, Interval::OneDay, DAILY_CANDLES),
        source.funding_rate(symbol),
        source.price_change_24h(symbol),
    );

    let candles = candles?;
    if candles.len() < MIN_KLINE_LIMIT {
        return Err(ChartistError::InsufficientData {
            indicator: "price series",
            required: MIN_KLINE_LIMIT,
            available: candles.len(),
        });
    }
    let daily = daily?;
    let change_24h_percent = change?;
    let funding_rate_percent = funding.unwrap_or_else(|e| {
        warn!(symbol, "Funding rate unavailable, assuming neutral: {e}");
        Decimal::ZERO
    });

    let inputs = AnalysisInputs {
        candles,
        daily,
        funding_rate_percent,
        change_24h_percent,
    };
    analysis::analyze(request, &inputs, config)
}
