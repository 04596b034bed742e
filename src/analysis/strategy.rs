//! Signal aggregation and strategy selection.
//!
//! Every indicator reading is turned into a [`SignalContribution`]; the
//! contributions sum to a composite score which is bucketed into one of
//! five [`Direction`] bands. Each band fixes its stop and targets from the
//! pivot ladder and an entry narrative keyed on a Fibonacci level.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::debug;

use super::Bias;
use super::candle_shape::CandleShape;
use super::config::AnalysisConfig;
use super::levels::{FibonacciLevels, PivotLevels};
use super::reversal::ReversalSummary;
use super::snapshot::IndicatorSnapshot;
use super::volume::VolumeSignal;

/// Trend-strength multipliers applied to every term except funding.
const STRONG_TREND_FACTOR: Decimal = dec!(1.2);
const WEAK_TREND_FACTOR: Decimal = dec!(0.8);

/// One scoring term and why it fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalContribution {
    pub source: &'static str,
    pub points: Decimal,
    pub note: String,
}

/// Everything the aggregator reads.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs<'a> {
    pub snapshot: &'a IndicatorSnapshot,
    pub candle: CandleShape,
    pub reversal: &'a ReversalSummary,
    pub volume: VolumeSignal,
    pub funding_rate_percent: Decimal,
}

/// Composite score with its itemised contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeScore {
    pub total: Decimal,
    pub trend_factor: Decimal,
    pub contributions: Vec<SignalContribution>,
}

fn bias_points(bias: Bias, weight: Decimal) -> Decimal {
    match bias {
        Bias::Bullish => weight,
        Bias::Bearish => -weight,
        Bias::Neutral => Decimal::ZERO,
    }
}

/// Sums the weighted signal terms in a fixed evaluation order.
pub fn composite_score(inputs: &ScoreInputs<'_>, config: &AnalysisConfig) -> CompositeScore {
    let snap = inputs.snapshot;
    let f = if snap.is_trending(config.adx_threshold) {
        STRONG_TREND_FACTOR
    } else {
        WEAK_TREND_FACTOR
    };
    let mut terms = Vec::with_capacity(8);

    let ma = snap.ma_alignment();
    terms.push(SignalContribution {
        source: "moving averages",
        points: bias_points(ma, dec!(2)) * f,
        note: match ma {
            Bias::Bullish => "MA5 > MA10 > MA20, bullish alignment",
            Bias::Bearish => "MA5 < MA10 < MA20, bearish alignment",
            Bias::Neutral => "moving averages tangled, no direction",
        }
        .to_string(),
    });

    let macd = snap.macd_bias();
    terms.push(SignalContribution {
        source: "MACD",
        points: bias_points(macd, dec!(2)) * f,
        note: match macd {
            Bias::Bullish => "golden cross with rising histogram",
            Bias::Bearish => "death cross with falling histogram",
            Bias::Neutral => "MACD signal unclear",
        }
        .to_string(),
    });

    let rsi = snap.rsi_bias();
    if rsi != Bias::Neutral {
        terms.push(SignalContribution {
            source: "RSI",
            points: bias_points(rsi, Decimal::ONE) * f,
            note: if rsi == Bias::Bullish {
                "RSI6 oversold, rebound likely"
            } else {
                "RSI6 overbought, pullback risk"
            }
            .to_string(),
        });
    }

    let kdj = snap.kdj_bias();
    if kdj != Bias::Neutral {
        terms.push(SignalContribution {
            source: "KDJ",
            points: bias_points(kdj, Decimal::ONE) * f,
            note: if kdj == Bias::Bullish {
                "KDJ oversold, golden cross possible"
            } else {
                "KDJ overbought, death cross possible"
            }
            .to_string(),
        });
    }

    terms.push(SignalContribution {
        source: "candle",
        points: inputs.candle.score() * f,
        note: inputs.candle.description().to_string(),
    });

    let names = inputs.reversal.names();
    terms.push(SignalContribution {
        source: "reversal patterns",
        points: inputs.reversal.score * f,
        note: if names.is_empty() {
            "no reversal pattern detected".to_string()
        } else {
            names.join(", ")
        },
    });

    if inputs.volume.score() != Decimal::ZERO {
        terms.push(SignalContribution {
            source: "volume",
            points: inputs.volume.score() * f,
            note: inputs.volume.description().to_string(),
        });
    }

    let funding = funding_bias(inputs.funding_rate_percent, config.funding_threshold);
    terms.push(SignalContribution {
        source: "funding rate",
        points: bias_points(funding, Decimal::ONE),
        note: match funding {
            Bias::Bearish => "funding high and positive, longs paying, favours shorts",
            Bias::Bullish => "funding deeply negative, shorts paying, favours longs",
            Bias::Neutral => "funding neutral, no crowded side",
        }
        .to_string(),
    });

    let total = terms.iter().map(|t| t.points).sum();
    CompositeScore {
        total,
        trend_factor: f,
        contributions: terms,
    }
}

/// Fades the crowded side: positive funding beyond the threshold is
/// bearish, negative beyond it bullish.
pub fn funding_bias(rate_percent: Decimal, threshold: Decimal) -> Bias {
    if rate_percent > threshold {
        Bias::Bearish
    } else if rate_percent < -threshold {
        Bias::Bullish
    } else {
        Bias::Neutral
    }
}

/// Trade side implied by a directional band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    fn sign(self) -> Decimal {
        match self {
            Side::Long => Decimal::ONE,
            Side::Short => Decimal::NEGATIVE_ONE,
        }
    }

    fn opposite(self) -> Side {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
        }
    }

    fn beyond(self) -> &'static str {
        match self {
            Side::Long => "above",
            Side::Short => "below",
        }
    }

    /// Move back toward a level from the trade side.
    fn retrace(self) -> &'static str {
        match self {
            Side::Long => "pullback",
            Side::Short => "rebound",
        }
    }
}

/// How far the score sits from neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Conviction {
    Strong,
    Mild,
}

/// The five decision bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    StrongBullish,
    MildBullish,
    Ranging,
    MildBearish,
    StrongBearish,
}

impl Direction {
    pub fn from_score(score: Decimal) -> Self {
        if score >= dec!(4) {
            Self::StrongBullish
        } else if score >= dec!(2) {
            Self::MildBullish
        } else if score <= dec!(-4) {
            Self::StrongBearish
        } else if score <= dec!(-2) {
            Self::MildBearish
        } else {
            Self::Ranging
        }
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            Self::StrongBullish | Self::MildBullish => Some(Side::Long),
            Self::StrongBearish | Self::MildBearish => Some(Side::Short),
            Self::Ranging => None,
        }
    }

    pub fn conviction(&self) -> Option<Conviction> {
        match self {
            Self::StrongBullish | Self::StrongBearish => Some(Conviction::Strong),
            Self::MildBullish | Self::MildBearish => Some(Conviction::Mild),
            Self::Ranging => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongBullish => "bullish (strong uptrend)",
            Self::MildBullish => "ranging with bullish bias (short-term rebound likely)",
            Self::Ranging => "ranging (bulls and bears in balance)",
            Self::MildBearish => "ranging with bearish bias (under pressure, key support holding)",
            Self::StrongBearish => "bearish (strong downtrend)",
        }
    }

    /// `(stop, target1, target2)` from the pivot ladder.
    pub fn levels(&self, p: &PivotLevels) -> (Decimal, Decimal, Decimal) {
        match self {
            Self::StrongBullish => (p.s3, p.r1, p.r2),
            Self::MildBullish | Self::Ranging => (p.s2, p.r1, p.r2),
            Self::MildBearish => (p.r2, p.s1, p.s2),
            Self::StrongBearish => (p.r3, p.s1, p.s2),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Entry, stop and targets for one side of a range trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradePlan {
    pub side: Side,
    pub trigger: Decimal,
    pub stop: Decimal,
    pub target1: Decimal,
    pub target2: Decimal,
}

/// Breakout plans for both sides of the pivot range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangePlan {
    pub long: TradePlan,
    pub short: TradePlan,
}

impl RangePlan {
    pub fn from_pivots(p: &PivotLevels) -> Self {
        Self {
            long: TradePlan {
                side: Side::Long,
                trigger: p.r1,
                stop: p.s1,
                target1: p.r2,
                target2: p.r3,
            },
            short: TradePlan {
                side: Side::Short,
                trigger: p.s1,
                stop: p.r1,
                target1: p.s2,
                target2: p.s3,
            },
        }
    }
}

/// Final recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyDecision {
    pub direction: Direction,
    pub entry: String,
    pub stop_loss: Decimal,
    pub target1: Decimal,
    pub target2: Decimal,
    pub composite_score: Decimal,
    /// `|price - stop| / price * 100`.
    pub risk_percent: Decimal,
    /// Only present in the ranging band.
    pub range_plan: Option<RangePlan>,
}

/// Entry narrative for a directional band.
///
/// Strong bands key on the 38.2% retracement: if price has not crossed it
/// in the trade direction, wait for the breakout, otherwise wait for a
/// retrace to it. Mild bands key on 50%: on the trade side, wait for a
/// retrace to 50% or the nearest pivot (S1 for longs, R1 for shorts);
/// otherwise probe the opposite side at 50%.
pub fn entry_plan(
    side: Side,
    conviction: Conviction,
    price: Decimal,
    fib: &FibonacciLevels,
    pivots: &PivotLevels,
) -> String {
    let verb = side.verb();
    match conviction {
        Conviction::Strong => {
            let level = fib.level_382();
            let tail = if side.sign() * (price - level) < Decimal::ZERO {
                format!(
                    "or scale in after a decisive break {} the 38.2% Fibonacci level {level:.2}",
                    side.beyond()
                )
            } else {
                format!(
                    "or scale in on a {} to the 38.2% Fibonacci level {level:.2}",
                    side.retrace()
                )
            };
            format!("Light {verb} near current price {price:.2}, {tail}.")
        }
        Conviction::Mild => {
            let level = fib.level_500();
            let tail = if side.sign() * (price - level) > Decimal::ZERO {
                let (name, pivot) = match side {
                    Side::Long => ("S1", pivots.s1),
                    Side::Short => ("R1", pivots.r1),
                };
                format!(
                    "or scale in on a {} to the 50% Fibonacci level {level:.2} or {name} {pivot:.2}",
                    side.retrace()
                )
            } else {
                let counter = side.opposite();
                format!(
                    "or try a light counter-trend {} on a {} to the 50% Fibonacci level {level:.2}, with caution",
                    counter.verb(),
                    counter.retrace()
                )
            };
            format!("Aggressive traders may open a light {verb} near {price:.2}, {tail}.")
        }
    }
}

/// Maps the composite score to a band and fills in its levels.
pub fn decide(
    score: Decimal,
    price: Decimal,
    pivots: &PivotLevels,
    fib: &FibonacciLevels,
) -> StrategyDecision {
    let direction = Direction::from_score(score);
    let (stop_loss, target1, target2) = direction.levels(pivots);

    let (entry, range_plan) = match (direction.side(), direction.conviction()) {
        (Some(side), Some(conviction)) => (entry_plan(side, conviction, price, fib, pivots), None),
        _ => (
            format!(
                "Wait for a decisive break above R1 {:.2} or below S1 {:.2} before entering.",
                pivots.r1, pivots.s1
            ),
            Some(RangePlan::from_pivots(pivots)),
        ),
    };

    let risk_percent = if price.is_zero() {
        Decimal::ZERO
    } else {
        (price - stop_loss).abs() / price * dec!(100)
    };

    debug!(score = %score, ?direction, stop = %stop_loss, "strategy selected");

    StrategyDecision {
        direction,
        entry,
        stop_loss,
        target1,
        target2,
        composite_score: score,
        risk_percent,
        range_plan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::patterns::{PatternHit, PatternKind};
    use crate::analysis::snapshot::Kdj;
    use crate::indicators::{AdxPoint, BollingerPoint, MacdPoint};
    use crate::models::Candle;

    fn neutral_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            ma5: dec!(100),
            ma10: dec!(100),
            ma20: dec!(100),
            macd: MacdPoint {
                line: dec!(0),
                signal: dec!(0),
                histogram: dec!(0),
            },
            prev_macd_histogram: None,
            boll: BollingerPoint {
                upper: dec!(110),
                middle: dec!(100),
                lower: dec!(90),
            },
            rsi6: dec!(50),
            rsi14: dec!(50),
            kdj: Kdj {
                k: dec!(50),
                d: dec!(50),
                j: dec!(50),
            },
            adx: AdxPoint {
                adx: dec!(20),
                plus_di: dec!(20),
                minus_di: dec!(20),
            },
            volume_ma20: dec!(100),
        }
    }

    fn bullish_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            ma5: dec!(103),
            ma10: dec!(102),
            ma20: dec!(101),
            macd: MacdPoint {
                line: dec!(1.5),
                signal: dec!(1),
                histogram: dec!(0.5),
            },
            rsi6: dec!(25),
            adx: AdxPoint {
                adx: dec!(30),
                plus_di: dec!(30),
                minus_di: dec!(10),
            },
            ..neutral_snapshot()
        }
    }

    fn empty_reversal() -> ReversalSummary {
        ReversalSummary {
            hits: Vec::new(),
            score: Decimal::ZERO,
        }
    }

    fn inputs<'a>(snapshot: &'a IndicatorSnapshot, reversal: &'a ReversalSummary) -> ScoreInputs<'a> {
        ScoreInputs {
            snapshot,
            candle: CandleShape::Ordinary,
            reversal,
            volume: VolumeSignal::Neutral,
            funding_rate_percent: Decimal::ZERO,
        }
    }

    fn pivots() -> PivotLevels {
        PivotLevels::new(dec!(120), dec!(90), dec!(105))
    }

    /// Uptrend fib over 90..120: 38.2% = 101.46, 50% = 105.
    fn fib() -> FibonacciLevels {
        let w = [
            Candle::new(0, dec!(100), dec!(120), dec!(95), dec!(100), dec!(1)),
            Candle::new(1, dec!(100), dec!(110), dec!(90), dec!(101), dec!(1)),
        ];
        FibonacciLevels::from_window(&w).unwrap()
    }

    #[test]
    fn strong_bullish_end_to_end() {
        let snap = bullish_snapshot();
        let rev = empty_reversal();
        let score = composite_score(&inputs(&snap, &rev), &AnalysisConfig::default());

        assert_eq!(score.trend_factor, dec!(1.2));
        let points: Vec<_> = score.contributions.iter().map(|c| (c.source, c.points)).collect();
        assert!(points.contains(&("moving averages", dec!(2.4))));
        assert!(points.contains(&("MACD", dec!(2.4))));
        assert!(points.contains(&("RSI", dec!(1.2))));
        assert_eq!(score.total, dec!(6.0));

        let decision = decide(score.total, dec!(104), &pivots(), &fib());
        let p = pivots();
        assert_eq!(decision.direction, Direction::StrongBullish);
        assert_eq!(decision.stop_loss, p.s3);
        assert_eq!(decision.target1, p.r1);
        assert_eq!(decision.target2, p.r2);
        assert!(decision.range_plan.is_none());
    }

    #[test]
    fn contributions_sum_to_total() {
        let snap = bullish_snapshot();
        let rev = ReversalSummary {
            hits: vec![PatternHit::from(PatternKind::ShootingStar)],
            score: dec!(-2),
        };
        let mut inp = inputs(&snap, &rev);
        inp.volume = VolumeSignal::ConfirmedSelloff;
        inp.funding_rate_percent = dec!(0.05);
        inp.candle = CandleShape::StrongBearish;

        let score = composite_score(&inp, &AnalysisConfig::default());
        let sum: Decimal = score.contributions.iter().map(|c| c.points).sum();
        assert_eq!(sum, score.total);
        // 2.4 + 2.4 + 1.2 - 1.2 - 2.4 - 1.2 - 1
        assert_eq!(score.total, dec!(0.2));
    }

    #[test]
    fn weak_trend_scales_by_point_eight_but_not_funding() {
        let snap = IndicatorSnapshot {
            adx: AdxPoint {
                adx: dec!(25),
                plus_di: dec!(10),
                minus_di: dec!(10),
            },
            ..bullish_snapshot()
        };
        let rev = empty_reversal();
        let mut inp = inputs(&snap, &rev);
        inp.funding_rate_percent = dec!(-0.02);

        let score = composite_score(&inp, &AnalysisConfig::default());
        assert_eq!(score.trend_factor, dec!(0.8));
        let funding = score
            .contributions
            .iter()
            .find(|c| c.source == "funding rate")
            .unwrap();
        assert_eq!(funding.points, Decimal::ONE);
        assert_eq!(score.total, dec!(1.6) + dec!(1.6) + dec!(0.8) + Decimal::ONE);
    }

    #[test]
    fn funding_threshold_is_exclusive() {
        assert_eq!(funding_bias(dec!(0.01), dec!(0.01)), Bias::Neutral);
        assert_eq!(funding_bias(dec!(0.0101), dec!(0.01)), Bias::Bearish);
        assert_eq!(funding_bias(dec!(-0.0101), dec!(0.01)), Bias::Bullish);
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(Direction::from_score(dec!(4)), Direction::StrongBullish);
        assert_eq!(Direction::from_score(dec!(3.99)), Direction::MildBullish);
        assert_eq!(Direction::from_score(dec!(2)), Direction::MildBullish);
        assert_eq!(Direction::from_score(dec!(1.99)), Direction::Ranging);
        assert_eq!(Direction::from_score(dec!(-1.99)), Direction::Ranging);
        assert_eq!(Direction::from_score(dec!(-2)), Direction::MildBearish);
        assert_eq!(Direction::from_score(dec!(-3.99)), Direction::MildBearish);
        assert_eq!(Direction::from_score(dec!(-4)), Direction::StrongBearish);
    }

    #[test]
    fn bearish_bands_use_resistance_stops() {
        let p = pivots();
        assert_eq!(Direction::MildBearish.levels(&p), (p.r2, p.s1, p.s2));
        assert_eq!(Direction::StrongBearish.levels(&p), (p.r3, p.s1, p.s2));
        assert_eq!(Direction::Ranging.levels(&p), (p.s2, p.r1, p.r2));
    }

    #[test]
    fn ranging_band_carries_range_plan() {
        let p = pivots();
        let decision = decide(dec!(0.5), dec!(104), &p, &fib());
        assert_eq!(decision.direction, Direction::Ranging);
        let plan = decision.range_plan.unwrap();
        assert_eq!((plan.long.trigger, plan.long.stop), (p.r1, p.s1));
        assert_eq!((plan.short.target1, plan.short.target2), (p.s2, p.s3));
        assert!(decision.entry.contains("R1 120.00"));
    }

    #[test]
    fn strong_entry_keys_on_382() {
        let f = fib();
        let p = pivots();
        let below = entry_plan(Side::Long, Conviction::Strong, dec!(100), &f, &p);
        assert!(below.contains("break above the 38.2% Fibonacci level 101.46"), "{below}");
        let above = entry_plan(Side::Long, Conviction::Strong, dec!(104), &f, &p);
        assert!(above.contains("pullback to the 38.2%"), "{above}");

        let short_above = entry_plan(Side::Short, Conviction::Strong, dec!(104), &f, &p);
        assert!(short_above.contains("break below the 38.2%"), "{short_above}");
        let short_below = entry_plan(Side::Short, Conviction::Strong, dec!(100), &f, &p);
        assert!(short_below.contains("rebound to the 38.2%"), "{short_below}");
    }

    #[test]
    fn mild_entry_keys_on_50_and_nearest_pivot() {
        let f = fib();
        let p = pivots();
        let long_side = entry_plan(Side::Long, Conviction::Mild, dec!(110), &f, &p);
        assert!(long_side.contains("pullback to the 50% Fibonacci level 105.00 or S1 90.00"), "{long_side}");
        let long_counter = entry_plan(Side::Long, Conviction::Mild, dec!(100), &f, &p);
        assert!(long_counter.contains("counter-trend short on a rebound"), "{long_counter}");

        let short_side = entry_plan(Side::Short, Conviction::Mild, dec!(100), &f, &p);
        assert!(short_side.contains("or R1 120.00"), "{short_side}");
        let short_counter = entry_plan(Side::Short, Conviction::Mild, dec!(110), &f, &p);
        assert!(short_counter.contains("counter-trend long on a pullback"), "{short_counter}");
    }

    #[test]
    fn risk_percent_is_distance_to_stop() {
        let p = pivots();
        let decision = decide(dec!(5), dec!(100), &p, &fib());
        // stop S3 = 60
        assert_eq!(decision.risk_percent, dec!(40));
    }

    #[test]
    fn identical_inputs_give_identical_decisions() {
        let snap = bullish_snapshot();
        let rev = empty_reversal();
        let a = composite_score(&inputs(&snap, &rev), &AnalysisConfig::default());
        let b = composite_score(&inputs(&snap, &rev), &AnalysisConfig::default());
        assert_eq!(a, b);
        assert_eq!(
            decide(a.total, dec!(104), &pivots(), &fib()),
            decide(b.total, dec!(104), &pivots(), &fib())
        );
    }
}
