//! Multi-candle reversal pattern library.
//!
//! Every detector is a pure predicate over a trailing window of candles
//! (oldest first) and looks only at the last one, two or three bars. A
//! window that is too short, or a zero denominator, yields `false`.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::Bias;
use super::geometry::{body, body_midpoint, body_ratio, lower_shadow, range_ratio, upper_shadow};
use crate::models::Candle;

/// Named candlestick patterns recognised by the reversal aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    BullishEngulfing,
    MorningStar,
    MorningDojiStar,
    PiercingLine,
    BullishHarami,
    BullishHaramiCross,
    BullishMarubozu,
    ThreeWhiteSoldiers,
    Hammer,
    InvertedHammer,
    DownsideTasukiGap,
    TweezerBottom,
    BearishEngulfing,
    EveningStar,
    EveningDojiStar,
    BearishHarami,
    BearishHaramiCross,
    BearishMarubozu,
    ThreeBlackCrows,
    HangingMan,
    ShootingStar,
    TweezerTop,
    /// Hammer shape opening below the prior close (no downtrend context).
    HammerUnconfirmed,
    /// Hammer shape on a bullish candle.
    HangingManUnconfirmed,
}

impl PatternKind {
    /// All patterns in detection order. Hit lists preserve this order.
    pub const ALL: [PatternKind; 24] = [
        PatternKind::BullishEngulfing,
        PatternKind::MorningStar,
        PatternKind::MorningDojiStar,
        PatternKind::PiercingLine,
        PatternKind::BullishHarami,
        PatternKind::BullishHaramiCross,
        PatternKind::BullishMarubozu,
        PatternKind::ThreeWhiteSoldiers,
        PatternKind::Hammer,
        PatternKind::InvertedHammer,
        PatternKind::DownsideTasukiGap,
        PatternKind::TweezerBottom,
        PatternKind::BearishEngulfing,
        PatternKind::EveningStar,
        PatternKind::EveningDojiStar,
        PatternKind::BearishHarami,
        PatternKind::BearishHaramiCross,
        PatternKind::BearishMarubozu,
        PatternKind::ThreeBlackCrows,
        PatternKind::HangingMan,
        PatternKind::ShootingStar,
        PatternKind::TweezerTop,
        PatternKind::HammerUnconfirmed,
        PatternKind::HangingManUnconfirmed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::BullishEngulfing => "Bullish Engulfing",
            Self::MorningStar => "Morning Star",
            Self::MorningDojiStar => "Morning Doji Star",
            Self::PiercingLine => "Piercing Line",
            Self::BullishHarami => "Bullish Harami",
            Self::BullishHaramiCross => "Bullish Harami Cross",
            Self::BullishMarubozu => "Bullish Marubozu",
            Self::ThreeWhiteSoldiers => "Three White Soldiers",
            Self::Hammer => "Hammer",
            Self::InvertedHammer => "Inverted Hammer",
            Self::DownsideTasukiGap => "Downside Tasuki Gap",
            Self::TweezerBottom => "Tweezer Bottom",
            Self::BearishEngulfing => "Bearish Engulfing",
            Self::EveningStar => "Evening Star",
            Self::EveningDojiStar => "Evening Doji Star",
            Self::BearishHarami => "Bearish Harami",
            Self::BearishHaramiCross => "Bearish Harami Cross",
            Self::BearishMarubozu => "Bearish Marubozu",
            Self::ThreeBlackCrows => "Three Black Crows",
            Self::HangingMan => "Hanging Man",
            Self::ShootingStar => "Shooting Star",
            Self::TweezerTop => "Tweezer Top",
            Self::HammerUnconfirmed => "Hammer (unconfirmed)",
            Self::HangingManUnconfirmed => "Hanging Man (unconfirmed)",
        }
    }

    /// Fixed score contribution; the sign always matches [`Self::bias`].
    pub fn weight(&self) -> Decimal {
        match self {
            Self::BullishEngulfing => dec!(2),
            Self::MorningStar => dec!(3),
            Self::MorningDojiStar => dec!(3.5),
            Self::PiercingLine => dec!(2),
            Self::BullishHarami => dec!(1),
            Self::BullishHaramiCross => dec!(1.5),
            Self::BullishMarubozu => dec!(2),
            Self::ThreeWhiteSoldiers => dec!(3),
            Self::Hammer => dec!(2),
            Self::InvertedHammer => dec!(2),
            Self::DownsideTasukiGap => dec!(1.5),
            Self::TweezerBottom => dec!(1.5),
            Self::HammerUnconfirmed => dec!(1),
            Self::BearishEngulfing => dec!(-2),
            Self::EveningStar => dec!(-3),
            Self::EveningDojiStar => dec!(-3.5),
            Self::BearishHarami => dec!(-1),
            Self::BearishHaramiCross => dec!(-1.5),
            Self::BearishMarubozu => dec!(-2),
            Self::ThreeBlackCrows => dec!(-3),
            Self::HangingMan => dec!(-2),
            Self::ShootingStar => dec!(-2),
            Self::TweezerTop => dec!(-1.5),
            Self::HangingManUnconfirmed => dec!(-1),
        }
    }

    pub fn bias(&self) -> Bias {
        if self.weight() > Decimal::ZERO {
            Bias::Bullish
        } else {
            Bias::Bearish
        }
    }

    /// Runs this pattern's detector against the trailing window.
    pub fn detect(&self, window: &[Candle]) -> bool {
        match self {
            Self::BullishEngulfing => is_bullish_engulfing(window),
            Self::MorningStar => is_morning_star(window),
            Self::MorningDojiStar => is_morning_doji_star(window),
            Self::PiercingLine => is_piercing_line(window),
            Self::BullishHarami => is_bullish_harami(window),
            Self::BullishHaramiCross => is_bullish_harami_cross(window),
            Self::BullishMarubozu => is_bullish_marubozu(window),
            Self::ThreeWhiteSoldiers => is_three_white_soldiers(window),
            Self::Hammer => is_hammer(window),
            Self::InvertedHammer => is_inverted_hammer(window),
            Self::DownsideTasukiGap => is_downside_tasuki_gap(window),
            Self::TweezerBottom => is_tweezer_bottom(window),
            Self::BearishEngulfing => is_bearish_engulfing(window),
            Self::EveningStar => is_evening_star(window),
            Self::EveningDojiStar => is_evening_doji_star(window),
            Self::BearishHarami => is_bearish_harami(window),
            Self::BearishHaramiCross => is_bearish_harami_cross(window),
            Self::BearishMarubozu => is_bearish_marubozu(window),
            Self::ThreeBlackCrows => is_three_black_crows(window),
            Self::HangingMan => is_hanging_man(window),
            Self::ShootingStar => is_shooting_star(window),
            Self::TweezerTop => is_tweezer_top(window),
            Self::HammerUnconfirmed => is_hammer_unconfirmed(window),
            Self::HangingManUnconfirmed => is_hanging_man_unconfirmed(window),
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A detected pattern with its typed bias and weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatternHit {
    pub kind: PatternKind,
    pub bias: Bias,
    pub weight: Decimal,
}

impl PatternHit {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl From<PatternKind> for PatternHit {
    fn from(kind: PatternKind) -> Self {
        Self {
            kind,
            bias: kind.bias(),
            weight: kind.weight(),
        }
    }
}

fn last_two(w: &[Candle]) -> Option<(&Candle, &Candle)> {
    match w {
        [.., prev, curr] => Some((prev, curr)),
        _ => None,
    }
}

fn last_three(w: &[Candle]) -> Option<(&Candle, &Candle, &Candle)> {
    match w {
        [.., first, second, third] => Some((first, second, third)),
        _ => None,
    }
}

/// Tolerance for tweezer highs/lows: 0.05 % of the earlier bar's price.
const TWEEZER_TOLERANCE: Decimal = dec!(0.0005);

/// Doji test for the middle star: `body / (open + close)` below this.
const STAR_DOJI_RATIO: Decimal = dec!(0.001);

fn is_star_doji(c: &Candle) -> bool {
    let denom = c.open + c.close;
    denom > Decimal::ZERO && body(c) / denom < STAR_DOJI_RATIO
}

// -- Two-candle patterns -----------------------------------------------------

pub fn is_bullish_engulfing(w: &[Candle]) -> bool {
    last_two(w).is_some_and(|(prev, curr)| {
        prev.is_bearish() && curr.is_bullish() && curr.open <= prev.close && curr.close >= prev.open
    })
}

pub fn is_bearish_engulfing(w: &[Candle]) -> bool {
    last_two(w).is_some_and(|(prev, curr)| {
        prev.is_bullish() && curr.is_bearish() && curr.open >= prev.close && curr.close <= prev.open
    })
}

pub fn is_bullish_harami(w: &[Candle]) -> bool {
    last_two(w).is_some_and(|(prev, curr)| {
        prev.is_bearish() && curr.is_bullish() && curr.open >= prev.close && curr.close <= prev.open
    })
}

/// Current body under 10 % of the prior bearish body, nested inside it.
pub fn is_bullish_harami_cross(w: &[Candle]) -> bool {
    last_two(w).is_some_and(|(prev, curr)| {
        prev.is_bearish()
            && body(curr) < body(prev) * dec!(0.1)
            && curr.open >= prev.close
            && curr.close <= prev.open
    })
}

pub fn is_bearish_harami(w: &[Candle]) -> bool {
    last_two(w).is_some_and(|(prev, curr)| {
        prev.is_bullish() && curr.is_bearish() && curr.open <= prev.close && curr.close >= prev.open
    })
}

pub fn is_bearish_harami_cross(w: &[Candle]) -> bool {
    last_two(w).is_some_and(|(prev, curr)| {
        prev.is_bullish()
            && body(curr) / body(prev) < dec!(0.1)
            && curr.open <= prev.close
            && curr.close >= prev.open
    })
}

/// Opens below the prior bearish close, closes past its midpoint but
/// below its open.
pub fn is_piercing_line(w: &[Candle]) -> bool {
    last_two(w).is_some_and(|(prev, curr)| {
        prev.is_bearish()
            && curr.is_bullish()
            && curr.open < prev.close
            && curr.close > body_midpoint(prev)
            && curr.close < prev.open
    })
}

pub fn is_tweezer_bottom(w: &[Candle]) -> bool {
    last_two(w).is_some_and(|(prev, curr)| (curr.low - prev.low).abs() < prev.low * TWEEZER_TOLERANCE)
}

pub fn is_tweezer_top(w: &[Candle]) -> bool {
    last_two(w)
        .is_some_and(|(prev, curr)| (curr.high - prev.high).abs() < prev.high * TWEEZER_TOLERANCE)
}

// -- Three-candle patterns ---------------------------------------------------

pub fn is_morning_star(w: &[Candle]) -> bool {
    last_three(w).is_some_and(|(first, second, third)| {
        first.is_bearish()
            && second.is_bearish()
            && second.close < first.close
            && third.is_bullish()
            && third.close > body_midpoint(first)
    })
}

pub fn is_morning_doji_star(w: &[Candle]) -> bool {
    last_three(w).is_some_and(|(first, second, third)| {
        first.is_bearish()
            && is_star_doji(second)
            && second.close < first.low
            && third.is_bullish()
            && third.close > body_midpoint(first)
    })
}

pub fn is_evening_star(w: &[Candle]) -> bool {
    last_three(w).is_some_and(|(first, second, third)| {
        first.is_bullish()
            && second.is_bullish()
            && second.open > first.close
            && third.is_bearish()
            && third.close < body_midpoint(first)
    })
}

pub fn is_evening_doji_star(w: &[Candle]) -> bool {
    last_three(w).is_some_and(|(first, second, third)| {
        first.is_bullish()
            && is_star_doji(second)
            && second.close > first.high
            && third.is_bearish()
            && third.close < body_midpoint(first)
    })
}

/// Three rising bullish bodies, each opening inside the previous body.
pub fn is_three_white_soldiers(w: &[Candle]) -> bool {
    last_three(w).is_some_and(|(first, second, third)| {
        first.is_bullish()
            && second.is_bullish()
            && third.is_bullish()
            && second.open < first.close
            && second.open > first.open
            && third.open < second.close
            && third.open > second.open
            && second.close > first.close
            && third.close > second.close
    })
}

/// Three falling bearish bodies, each opening inside the previous body.
pub fn is_three_black_crows(w: &[Candle]) -> bool {
    last_three(w).is_some_and(|(first, second, third)| {
        first.is_bearish()
            && second.is_bearish()
            && third.is_bearish()
            && second.open < first.open
            && second.open > first.close
            && third.open < second.open
            && third.open > second.close
            && second.close < first.close
            && third.close < second.close
    })
}

/// Two bearish bars gapping down, then a bullish bar that opens above the
/// second close and closes below the first open.
pub fn is_downside_tasuki_gap(w: &[Candle]) -> bool {
    last_three(w).is_some_and(|(first, second, third)| {
        first.is_bearish()
            && second.is_bearish()
            && second.open < first.close
            && third.is_bullish()
            && third.open > second.close
            && third.close < first.open
    })
}

// -- Single-candle shapes with context ---------------------------------------

pub fn is_bullish_marubozu(w: &[Candle]) -> bool {
    w.last().is_some_and(|c| {
        let b = body(c);
        c.is_bullish()
            && body_ratio(c).is_some_and(|r| r > dec!(0.9))
            && upper_shadow(c) < b * dec!(0.1)
            && lower_shadow(c) < b * dec!(0.1)
    })
}

pub fn is_bearish_marubozu(w: &[Candle]) -> bool {
    w.last().is_some_and(|c| {
        c.is_bearish()
            && body_ratio(c).is_some_and(|r| r > dec!(0.95))
            && range_ratio(c, upper_shadow(c)).is_some_and(|r| r < dec!(0.05))
            && range_ratio(c, lower_shadow(c)).is_some_and(|r| r < dec!(0.05))
    })
}

/// Long lower shadow, short upper shadow, small body.
pub fn has_hammer_shape(c: &Candle) -> bool {
    let b = body(c);
    lower_shadow(c) > b * dec!(2)
        && upper_shadow(c) < b * dec!(0.5)
        && body_ratio(c).is_some_and(|r| r < dec!(0.3))
}

/// Long upper shadow, short lower shadow, small body.
pub fn has_inverted_hammer_shape(c: &Candle) -> bool {
    let b = body(c);
    upper_shadow(c) > b * dec!(2)
        && lower_shadow(c) < b * dec!(0.5)
        && body_ratio(c).is_some_and(|r| r < dec!(0.3))
}

/// Hammer shape opening above the prior close.
pub fn is_hammer(w: &[Candle]) -> bool {
    last_two(w).is_some_and(|(prev, curr)| has_hammer_shape(curr) && prev.close < curr.open)
}

/// Inverted hammer shape opening above the prior close.
pub fn is_inverted_hammer(w: &[Candle]) -> bool {
    last_two(w).is_some_and(|(prev, curr)| has_inverted_hammer_shape(curr) && prev.close < curr.open)
}

/// Hammer shape that closed down.
pub fn is_hanging_man(w: &[Candle]) -> bool {
    w.last().is_some_and(|c| has_hammer_shape(c) && c.is_bearish())
}

/// Inverted hammer shape that closed down.
pub fn is_shooting_star(w: &[Candle]) -> bool {
    w.last().is_some_and(|c| has_inverted_hammer_shape(c) && c.is_bearish())
}

/// Hammer shape opening below the prior close: the textbook downtrend
/// context is missing.
pub fn is_hammer_unconfirmed(w: &[Candle]) -> bool {
    last_two(w).is_some_and(|(prev, curr)| has_hammer_shape(curr) && prev.close > curr.open)
}

/// Hanging-man shape that closed up.
pub fn is_hanging_man_unconfirmed(w: &[Candle]) -> bool {
    w.last().is_some_and(|c| has_hammer_shape(c) && c.is_bullish())
}
