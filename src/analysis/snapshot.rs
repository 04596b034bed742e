//! Latest-value snapshot over the indicator primitives.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::Bias;
use crate::indicators::{self, AdxPoint, BollingerPoint, MacdPoint};
use crate::models::candle::CandleColumns;
use crate::{ChartistError, Result};

/// Stochastic `%K`/`%D` plus the derived `J = 3K - 2D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Kdj {
    pub k: Decimal,
    pub d: Decimal,
    pub j: Decimal,
}

/// Latest value of every indicator the strategy reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorSnapshot {
    pub ma5: Decimal,
    pub ma10: Decimal,
    pub ma20: Decimal,
    pub macd: MacdPoint,
    /// Histogram one bar earlier, when the signal line has two points.
    pub prev_macd_histogram: Option<Decimal>,
    pub boll: BollingerPoint,
    pub rsi6: Decimal,
    pub rsi14: Decimal,
    pub kdj: Kdj,
    pub adx: AdxPoint,
    pub volume_ma20: Decimal,
}

/// Returns the last element or an [`ChartistError::InsufficientData`]
/// naming the indicator.
fn latest<T: Copy>(series: &[T], indicator: &'static str, required: usize, available: usize) -> Result<T> {
    series.last().copied().ok_or(ChartistError::InsufficientData {
        indicator,
        required,
        available,
    })
}

impl IndicatorSnapshot {
    /// Computes the snapshot from full candle columns.
    ///
    /// Indicators are evaluated in a fixed order and the first one without
    /// enough history is reported.
    ///
    /// # Errors
    ///
    /// [`ChartistError::InsufficientData`] when any series is shorter than
    /// its indicator's warm-up.
    pub fn compute(cols: &CandleColumns) -> Result<Self> {
        let n = cols.len();
        let close = &cols.close;

        let ma5 = latest(&indicators::sma(close, 5), "SMA(5)", 5, n)?;
        let ma10 = latest(&indicators::sma(close, 10), "SMA(10)", 10, n)?;
        let ma20 = latest(&indicators::sma(close, 20), "SMA(20)", 20, n)?;

        let macd_series = indicators::macd(close, 12, 26, 9);
        let macd = latest(&macd_series, "MACD(12,26,9)", 34, n)?;
        let prev_macd_histogram = macd_series
            .len()
            .checked_sub(2)
            .map(|i| macd_series[i].histogram);

        let boll = latest(&indicators::bollinger(close, 20, dec!(2)), "BOLL(20,2)", 20, n)?;
        let rsi6 = latest(&indicators::rsi(close, 6), "RSI(6)", 7, n)?;
        let rsi14 = latest(&indicators::rsi(close, 14), "RSI(14)", 15, n)?;

        let stoch = latest(
            &indicators::stochastic(&cols.high, &cols.low, close, 14, 3),
            "Stochastic(14,3)",
            16,
            n,
        )?;
        let kdj = Kdj {
            k: stoch.k,
            d: stoch.d,
            j: dec!(3) * stoch.k - dec!(2) * stoch.d,
        };

        let adx = latest(&indicators::adx(&cols.high, &cols.low, close, 14), "ADX(14)", 28, n)?;
        let volume_ma20 = latest(&indicators::sma(&cols.volume, 20), "Volume SMA(20)", 20, n)?;

        Ok(Self {
            ma5,
            ma10,
            ma20,
            macd,
            prev_macd_histogram,
            boll,
            rsi6,
            rsi14,
            kdj,
            adx,
            volume_ma20,
        })
    }

    /// Strict MA5/MA10/MA20 ordering.
    pub fn ma_alignment(&self) -> Bias {
        if self.ma5 > self.ma10 && self.ma10 > self.ma20 {
            Bias::Bullish
        } else if self.ma5 < self.ma10 && self.ma10 < self.ma20 {
            Bias::Bearish
        } else {
            Bias::Neutral
        }
    }

    /// Line/signal cross agreeing with the histogram sign.
    pub fn macd_bias(&self) -> Bias {
        let m = &self.macd;
        if m.line > m.signal && m.histogram > Decimal::ZERO {
            Bias::Bullish
        } else if m.line < m.signal && m.histogram < Decimal::ZERO {
            Bias::Bearish
        } else {
            Bias::Neutral
        }
    }

    /// Oversold RSI6 reads bullish, overbought bearish.
    pub fn rsi_bias(&self) -> Bias {
        if self.rsi6 < dec!(30) {
            Bias::Bullish
        } else if self.rsi6 > dec!(70) {
            Bias::Bearish
        } else {
            Bias::Neutral
        }
    }

    /// Both K and D oversold reads bullish, both overbought bearish.
    pub fn kdj_bias(&self) -> Bias {
        let Kdj { k, d, .. } = self.kdj;
        if k < dec!(20) && d < dec!(20) {
            Bias::Bullish
        } else if k > dec!(80) && d > dec!(80) {
            Bias::Bearish
        } else {
            Bias::Neutral
        }
    }

    pub fn is_trending(&self, adx_threshold: Decimal) -> bool {
        self.adx.adx > adx_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candle;

    fn zigzag(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let base = Decimal::from(100 + (i % 7) as i64 * 2 + (i / 3) as i64);
                Candle::new(i as i64, base, base + dec!(3), base - dec!(2), base + dec!(1), dec!(10))
            })
            .collect()
    }

    #[test]
    fn twenty_candles_fail_at_macd() {
        let cols = CandleColumns::from_candles(&zigzag(20));
        assert!(!indicators::sma(&cols.close, 20).is_empty());
        assert!(!indicators::bollinger(&cols.close, 20, dec!(2)).is_empty());
        assert!(indicators::adx(&cols.high, &cols.low, &cols.close, 14).is_empty());

        match IndicatorSnapshot::compute(&cols) {
            Err(ChartistError::InsufficientData {
                indicator,
                required,
                available,
            }) => {
                assert_eq!(indicator, "MACD(12,26,9)");
                assert_eq!(required, 34);
                assert_eq!(available, 20);
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn nineteen_candles_fail_at_sma20() {
        let cols = CandleColumns::from_candles(&zigzag(19));
        let err = IndicatorSnapshot::compute(&cols).unwrap_err();
        assert!(err.to_string().contains("SMA(20)"));
    }

    #[test]
    fn thirty_four_candles_are_enough() {
        let cols = CandleColumns::from_candles(&zigzag(34));
        let snap = IndicatorSnapshot::compute(&cols).unwrap();
        assert_eq!(snap.kdj.j, dec!(3) * snap.kdj.k - dec!(2) * snap.kdj.d);
        assert_eq!(snap.volume_ma20, dec!(10));
        assert!(snap.prev_macd_histogram.is_none());

        let cols = CandleColumns::from_candles(&zigzag(35));
        assert!(IndicatorSnapshot::compute(&cols).unwrap().prev_macd_histogram.is_some());
    }

    #[test]
    fn biases_follow_thresholds() {
        let cols = CandleColumns::from_candles(&zigzag(40));
        let mut snap = IndicatorSnapshot::compute(&cols).unwrap();

        snap.ma5 = dec!(3);
        snap.ma10 = dec!(2);
        snap.ma20 = dec!(1);
        assert_eq!(snap.ma_alignment(), Bias::Bullish);
        snap.ma10 = dec!(3);
        assert_eq!(snap.ma_alignment(), Bias::Neutral);

        snap.macd = MacdPoint {
            line: dec!(-1),
            signal: dec!(0),
            histogram: dec!(-1),
        };
        assert_eq!(snap.macd_bias(), Bias::Bearish);
        snap.macd.histogram = dec!(0.5);
        assert_eq!(snap.macd_bias(), Bias::Neutral);

        snap.rsi6 = dec!(29.9);
        assert_eq!(snap.rsi_bias(), Bias::Bullish);
        snap.rsi6 = dec!(70);
        assert_eq!(snap.rsi_bias(), Bias::Neutral);

        snap.kdj = Kdj {
            k: dec!(85),
            d: dec!(81),
            j: dec!(93),
        };
        assert_eq!(snap.kdj_bias(), Bias::Bearish);
        snap.kdj.d = dec!(79);
        assert_eq!(snap.kdj_bias(), Bias::Neutral);
    }
}
