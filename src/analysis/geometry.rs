//! Shape measurements of a single candle.
//!
//! Ratios against the candle's range return `None` when `high == low`, so
//! callers must decide what a degenerate candle means for them instead of
//! dividing by zero.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::Candle;

/// `|close - open|`.
pub fn body(c: &Candle) -> Decimal {
    (c.close - c.open).abs()
}

/// `high - low`.
pub fn range(c: &Candle) -> Decimal {
    c.high - c.low
}

/// `high - max(open, close)`.
pub fn upper_shadow(c: &Candle) -> Decimal {
    c.high - c.open.max(c.close)
}

/// `min(open, close) - low`.
pub fn lower_shadow(c: &Candle) -> Decimal {
    c.open.min(c.close) - c.low
}

/// Midpoint of the real body.
pub fn body_midpoint(c: &Candle) -> Decimal {
    (c.open + c.close) / dec!(2)
}

/// `value / range`, or `None` for a zero-range candle.
pub fn range_ratio(c: &Candle, value: Decimal) -> Option<Decimal> {
    let r = range(c);
    if r.is_zero() { None } else { Some(value / r) }
}

/// `body / range`, or `None` for a zero-range candle.
pub fn body_ratio(c: &Candle) -> Option<Decimal> {
    range_ratio(c, body(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Candle {
        Candle::new(0, open, high, low, close, dec!(1))
    }

    #[test]
    fn measures_bullish_candle() {
        let c = candle(dec!(10), dec!(15), dec!(8), dec!(13));
        assert_eq!(body(&c), dec!(3));
        assert_eq!(range(&c), dec!(7));
        assert_eq!(upper_shadow(&c), dec!(2));
        assert_eq!(lower_shadow(&c), dec!(2));
        assert_eq!(body_midpoint(&c), dec!(11.5));
    }

    #[test]
    fn shadows_use_body_edges_for_bearish_candle() {
        let c = candle(dec!(13), dec!(14), dec!(9), dec!(10));
        assert_eq!(upper_shadow(&c), dec!(1));
        assert_eq!(lower_shadow(&c), dec!(1));
        assert_eq!(body_ratio(&c), Some(dec!(0.6)));
    }

    #[test]
    fn zero_range_has_no_ratio() {
        let c = candle(dec!(5), dec!(5), dec!(5), dec!(5));
        assert_eq!(body_ratio(&c), None);
        assert_eq!(range_ratio(&c, dec!(1)), None);
    }
}
