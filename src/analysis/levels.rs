//! Classic pivot points and Fibonacci retracement levels.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::models::Candle;

/// Floor-trader pivots derived from one prior-period candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PivotLevels {
    pub pp: Decimal,
    pub r1: Decimal,
    pub r2: Decimal,
    pub r3: Decimal,
    pub s1: Decimal,
    pub s2: Decimal,
    pub s3: Decimal,
}

impl PivotLevels {
    pub fn new(high: Decimal, low: Decimal, close: Decimal) -> Self {
        let pp = (high + low + close) / dec!(3);
        let span = high - low;
        let r1 = dec!(2) * pp - low;
        let s1 = dec!(2) * pp - high;
        Self {
            pp,
            r1,
            r2: pp + span,
            r3: r1 + span,
            s1,
            s2: pp - span,
            s3: s1 - span,
        }
    }

    pub fn from_candle(previous: &Candle) -> Self {
        Self::new(previous.high, previous.low, previous.close)
    }
}

/// Retracement ratios, shallowest first.
pub const FIB_RATIOS: [Decimal; 5] = [dec!(0.236), dec!(0.382), dec!(0.5), dec!(0.618), dec!(0.786)];

/// One retracement level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FibLevel {
    pub ratio: Decimal,
    pub price: Decimal,
}

impl FibLevel {
    /// `"38.2%"` style label.
    pub fn label(&self) -> String {
        format!("{}%", (self.ratio * dec!(100)).normalize())
    }
}

/// Fibonacci retracements over a window's high/low range.
///
/// In an uptrend levels are measured up from the low (supports); in a
/// downtrend down from the high (resistances). The trend flag compares the
/// last two closes only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FibonacciLevels {
    pub uptrend: bool,
    pub high: Decimal,
    pub low: Decimal,
    pub levels: [FibLevel; 5],
}

impl FibonacciLevels {
    /// Returns `None` when the window holds fewer than two candles.
    pub fn from_window(window: &[Candle]) -> Option<Self> {
        let [.., previous, last] = window else {
            return None;
        };
        let high = window.iter().map(|c| c.high).max()?;
        let low = window.iter().map(|c| c.low).min()?;
        let uptrend = last.close > previous.close;
        let diff = high - low;

        let levels = FIB_RATIOS.map(|ratio| FibLevel {
            ratio,
            price: if uptrend {
                low + diff * ratio
            } else {
                high - diff * ratio
            },
        });

        Some(Self {
            uptrend,
            high,
            low,
            levels,
        })
    }

    /// Price at `ratio`, if it is one of [`FIB_RATIOS`].
    pub fn at(&self, ratio: Decimal) -> Option<Decimal> {
        self.levels.iter().find(|l| l.ratio == ratio).map(|l| l.price)
    }

    pub fn level_382(&self) -> Decimal {
        self.levels[1].price
    }

    pub fn level_500(&self) -> Decimal {
        self.levels[2].price
    }
}
