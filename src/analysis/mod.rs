//! Candlestick technical analysis.
//!
//! Everything under this module is a pure function of the candles and
//! scalars handed to [`analyze`]: indicator snapshot, single-candle shape,
//! reversal patterns, pivot and Fibonacci levels, volume reading and the
//! final strategy decision. Fetching lives in [`crate::market`] and
//! orchestration in [`crate::pipeline`].

pub mod candle_shape;
pub mod commentary;
pub mod config;
pub mod geometry;
pub mod levels;
pub mod patterns;
pub mod reversal;
pub mod snapshot;
pub mod strategy;
pub mod volume;

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::models::candle::CandleColumns;
use crate::models::{AnalysisRequest, Candle};
use crate::report::{AnalysisReport, VolumeReading};
use crate::{ChartistError, Result};

use commentary::IndicatorCommentary;
use config::AnalysisConfig;
use levels::{FibonacciLevels, PivotLevels};
use snapshot::IndicatorSnapshot;
use strategy::ScoreInputs;
use volume::VolumeSignal;

/// Directional reading shared by candles, patterns and indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    Bullish,
    Neutral,
    Bearish,
}

/// Market data for one run, oldest candle first.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInputs {
    /// Primary-interval candles.
    pub candles: Vec<Candle>,
    /// Daily candles; the second to last is the previous session.
    pub daily: Vec<Candle>,
    pub funding_rate_percent: Decimal,
    pub change_24h_percent: Decimal,
}

/// MA-ordering trend with ADX strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendReading {
    pub bias: Bias,
    pub adx: Decimal,
    pub strong: bool,
}

impl TrendReading {
    pub fn label(&self) -> &'static str {
        match self.bias {
            Bias::Bullish => "ranging, bullish bias",
            Bias::Bearish => "ranging, bearish bias",
            Bias::Neutral => "ranging",
        }
    }

    pub fn strength(&self) -> &'static str {
        if self.strong { "strong" } else { "weak" }
    }
}

impl fmt::Display for TrendReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (ADX: {:.2}, trend strength: {})",
            self.label(),
            self.adx,
            self.strength()
        )
    }
}

fn tail(candles: &[Candle], len: usize) -> &[Candle] {
    &candles[candles.len().saturating_sub(len)..]
}

/// Runs the full analysis over pre-fetched market data.
///
/// # Errors
///
/// [`ChartistError::InsufficientData`] if the candle series is too short
/// for any indicator or fewer than two daily candles are supplied.
pub fn analyze(
    request: &AnalysisRequest,
    inputs: &AnalysisInputs,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    let candles = &inputs.candles;
    let snapshot = IndicatorSnapshot::compute(&CandleColumns::from_candles(candles))?;

    let [.., previous, last] = candles.as_slice() else {
        return Err(ChartistError::InsufficientData {
            indicator: "price change",
            required: 2,
            available: candles.len(),
        });
    };
    let [.., prev_day, _] = inputs.daily.as_slice() else {
        return Err(ChartistError::InsufficientData {
            indicator: "daily pivots",
            required: 2,
            available: inputs.daily.len(),
        });
    };

    let price = last.close;
    let pivots = PivotLevels::from_candle(prev_day);
    let fib_window = tail(candles, config.fib_window.unwrap_or(candles.len()));
    let fibonacci = FibonacciLevels::from_window(fib_window).ok_or(ChartistError::InsufficientData {
        indicator: "Fibonacci levels",
        required: 2,
        available: fib_window.len(),
    })?;

    let candle = candle_shape::classify(last);
    let reversal = reversal::summarize(tail(candles, config.pattern_window));
    let volume_signal = VolumeSignal::classify(last.volume, snapshot.volume_ma20, last.close - previous.close);

    let score = strategy::composite_score(
        &ScoreInputs {
            snapshot: &snapshot,
            candle,
            reversal: &reversal,
            volume: volume_signal,
            funding_rate_percent: inputs.funding_rate_percent,
        },
        config,
    );
    let decision = strategy::decide(score.total, price, &pivots, &fibonacci);

    let trend = TrendReading {
        bias: snapshot.ma_alignment(),
        adx: snapshot.adx.adx,
        strong: snapshot.is_trending(config.adx_threshold),
    };
    let commentary = IndicatorCommentary::new(
        &snapshot,
        price,
        inputs.funding_rate_percent,
        config.funding_threshold,
        volume_signal,
        last.volume,
    );

    let volume = VolumeReading {
        signal: volume_signal,
        latest: last.volume,
        average: snapshot.volume_ma20,
    };

    info!(
        symbol = %request.symbol,
        interval = %request.interval,
        score = %score.total,
        direction = ?decision.direction,
        patterns = reversal.hits.len(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        symbol: request.symbol.clone(),
        interval: request.interval,
        current_price: price,
        change_24h_percent: inputs.change_24h_percent,
        pivots,
        fibonacci,
        trend,
        snapshot,
        commentary,
        funding_rate_percent: inputs.funding_rate_percent,
        volume,
        candle,
        reversal,
        score,
        decision,
    })
}
