//! Shared models for market data and analysis requests.
//!
//! Contains the candle type consumed by the analysis pipeline, the
//! Binance USDⓈ-M futures payloads it is built from, and the request value
//! that names the instrument and timeframe being analysed.

pub mod candle;
pub mod funding;
pub mod ticker;

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::ChartistError;

pub use candle::Candle;

/// Kline intervals accepted by the Binance futures API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    OneMinute,
    ThreeMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    FourHours,
    SixHours,
    EightHours,
    TwelveHours,
    OneDay,
    ThreeDays,
    OneWeek,
    /// Wire name: `"1M"` (capital M).
    OneMonth,
}

impl Interval {
    /// Returns the wire-format interval name expected by the Binance API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::ThreeMinutes => "3m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::TwoHours => "2h",
            Interval::FourHours => "4h",
            Interval::SixHours => "6h",
            Interval::EightHours => "8h",
            Interval::TwelveHours => "12h",
            Interval::OneDay => "1d",
            Interval::ThreeDays => "3d",
            Interval::OneWeek => "1w",
            Interval::OneMonth => "1M",
        }
    }

    const ALL: [Interval; 15] = [
        Interval::OneMinute,
        Interval::ThreeMinutes,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::OneHour,
        Interval::TwoHours,
        Interval::FourHours,
        Interval::SixHours,
        Interval::EightHours,
        Interval::TwelveHours,
        Interval::OneDay,
        Interval::ThreeDays,
        Interval::OneWeek,
        Interval::OneMonth,
    ];
}

impl FromStr for Interval {
    type Err = ChartistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| ChartistError::Config(format!("unsupported interval: {s}")))
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to analyse. Passed explicitly through every stage of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    /// Exchange symbol, e.g. `BTCUSDT`.
    pub symbol: String,
    pub interval: Interval,
}

impl AnalysisRequest {
    /// Builds a request, upper-casing the symbol.
    ///
    /// # Errors
    ///
    /// Returns [`ChartistError::Config`] for an empty or non-alphanumeric
    /// symbol.
    pub fn new(symbol: &str, interval: Interval) -> crate::Result<Self> {
        let symbol = symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ChartistError::Config(format!("invalid symbol: {symbol:?}")));
        }
        Ok(Self { symbol, interval })
    }
}
