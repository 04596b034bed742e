//! OHLCV candle model and Binance kline parsing.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ChartistError;

/// A single OHLCV candlestick bar.
///
/// Prices and volume are non-negative; `high` bounds the body from above
/// and `low` from below. The crate does not re-validate exchange data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Start of the candle's time window, milliseconds since the epoch.
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    pub fn new(
        open_time: i64,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Close strictly above open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Close strictly below open.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Parses one row of a `/fapi/v1/klines` response.
    ///
    /// Binance encodes a kline as a heterogeneous array:
    /// `[open_time, "open", "high", "low", "close", "volume", close_time, ...]`.
    /// Only the first six fields are used.
    ///
    /// # Errors
    ///
    /// Returns [`ChartistError::MalformedResponse`] if the row is too short
    /// or a field has the wrong type.
    pub fn from_kline_row(row: &[Value]) -> crate::Result<Self> {
        if row.len() < 6 {
            return Err(ChartistError::MalformedResponse(format!(
                "kline row has {} fields, expected at least 6",
                row.len()
            )));
        }
        let open_time = row[0].as_i64().ok_or_else(|| {
            ChartistError::MalformedResponse(format!("kline open time is not an integer: {}", row[0]))
        })?;

        Ok(Self {
            open_time,
            open: decimal_field(&row[1], "open")?,
            high: decimal_field(&row[2], "high")?,
            low: decimal_field(&row[3], "low")?,
            close: decimal_field(&row[4], "close")?,
            volume: decimal_field(&row[5], "volume")?,
        })
    }
}

/// Parses a full `/fapi/v1/klines` body into candles, oldest first.
///
/// # Errors
///
/// Returns an error if the body is not a JSON array of arrays or any row
/// fails [`Candle::from_kline_row`].
pub fn parse_klines(body: &str) -> crate::Result<Vec<Candle>> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;
    rows.iter().map(|row| Candle::from_kline_row(row)).collect()
}

/// Reads a Binance numeric field, which is usually a string but may be a
/// bare JSON number. Exponent notation (`1e-5`) is accepted in both.
fn decimal_field(value: &Value, name: &str) -> crate::Result<Decimal> {
    let parsed = match value {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    };
    parsed.ok_or_else(|| {
        ChartistError::MalformedResponse(format!("kline field {name} is not numeric: {value}"))
    })
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Column view over a candle slice, for indicator primitives that work on
/// plain price sequences.
#[derive(Debug, Clone, Default)]
pub struct CandleColumns {
    pub open: Vec<Decimal>,
    pub high: Vec<Decimal>,
    pub low: Vec<Decimal>,
    pub close: Vec<Decimal>,
    pub volume: Vec<Decimal>,
}

impl CandleColumns {
    pub fn from_candles(candles: &[Candle]) -> Self {
        let mut columns = Self {
            open: Vec::with_capacity(candles.len()),
            high: Vec::with_capacity(candles.len()),
            low: Vec::with_capacity(candles.len()),
            close: Vec::with_capacity(candles.len()),
            volume: Vec::with_capacity(candles.len()),
        };
        for c in candles {
            columns.open.push(c.open);
            columns.high.push(c.high);
            columns.low.push(c.low);
            columns.close.push(c.close);
            columns.volume.push(c.volume);
        }
        columns
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}
