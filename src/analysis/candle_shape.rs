//! Single-candle shape classifier for the most recent bar.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::Bias;
use super::geometry::{body_ratio, lower_shadow, range_ratio, upper_shadow};
use crate::models::Candle;

/// Qualitative reading of one candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandleShape {
    /// Body under 20 % of the range: doji or spinning top.
    Indecisive,
    /// Bullish body with a dominant lower shadow.
    LongLowerShadow,
    /// Bullish body over 70 % of the range.
    StrongBullish,
    /// Bearish body with a dominant upper shadow.
    LongUpperShadow,
    /// Bearish body over 70 % of the range.
    StrongBearish,
    /// Nothing notable.
    Ordinary,
    /// `high == low`; no shape can be measured.
    ZeroRange,
}

impl CandleShape {
    pub fn bias(&self) -> Bias {
        match self {
            Self::LongLowerShadow | Self::StrongBullish => Bias::Bullish,
            Self::LongUpperShadow | Self::StrongBearish => Bias::Bearish,
            Self::Indecisive | Self::Ordinary | Self::ZeroRange => Bias::Neutral,
        }
    }

    /// Contribution to the composite score before trend weighting.
    pub fn score(&self) -> Decimal {
        match self.bias() {
            Bias::Bullish => Decimal::ONE,
            Bias::Bearish => Decimal::NEGATIVE_ONE,
            Bias::Neutral => Decimal::ZERO,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Indecisive => "small body or doji, direction undecided",
            Self::LongLowerShadow => "long lower shadow, buyers defending below",
            Self::StrongBullish => "strong bullish candle, upside momentum",
            Self::LongUpperShadow => "long upper shadow, heavy selling overhead",
            Self::StrongBearish => "strong bearish candle, downside momentum",
            Self::Ordinary => "ordinary candle, no clear shape signal",
            Self::ZeroRange => "flat candle, no range to measure",
        }
    }
}

impl fmt::Display for CandleShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Classifies a candle; the first matching rule wins.
pub fn classify(c: &Candle) -> CandleShape {
    let Some(ratio) = body_ratio(c) else {
        return CandleShape::ZeroRange;
    };
    let upper = upper_shadow(c);
    let lower = lower_shadow(c);

    if ratio < dec!(0.2) {
        return CandleShape::Indecisive;
    }
    if c.is_bullish() {
        if lower > upper * dec!(2) && range_ratio(c, lower).is_some_and(|r| r > dec!(0.4)) {
            return CandleShape::LongLowerShadow;
        }
        if ratio > dec!(0.7) {
            return CandleShape::StrongBullish;
        }
    }
    if c.is_bearish() {
        if upper > lower * dec!(2) && range_ratio(c, upper).is_some_and(|r| r > dec!(0.4)) {
            return CandleShape::LongUpperShadow;
        }
        if ratio > dec!(0.7) {
            return CandleShape::StrongBearish;
        }
    }
    CandleShape::Ordinary
}
