//! Analysis report: the structured result of one run and its plain-text
//! rendering.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::analysis::TrendReading;
use crate::analysis::candle_shape::CandleShape;
use crate::analysis::commentary::IndicatorCommentary;
use crate::analysis::levels::{FibonacciLevels, PivotLevels};
use crate::analysis::reversal::ReversalSummary;
use crate::analysis::snapshot::IndicatorSnapshot;
use crate::analysis::strategy::{CompositeScore, Direction, StrategyDecision, TradePlan};
use crate::analysis::volume::VolumeSignal;
use crate::models::Interval;

/// Latest volume against its 20-period average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VolumeReading {
    pub signal: VolumeSignal,
    pub latest: Decimal,
    pub average: Decimal,
}

/// Everything produced by one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub interval: Interval,
    pub current_price: Decimal,
    pub change_24h_percent: Decimal,
    pub pivots: PivotLevels,
    pub fibonacci: FibonacciLevels,
    pub trend: TrendReading,
    pub snapshot: IndicatorSnapshot,
    pub commentary: IndicatorCommentary,
    pub funding_rate_percent: Decimal,
    pub volume: VolumeReading,
    pub candle: CandleShape,
    pub reversal: ReversalSummary,
    pub score: CompositeScore,
    pub decision: StrategyDecision,
}

impl AnalysisReport {
    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates serialization failures.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn write_trade_plan(f: &mut fmt::Formatter<'_>, title: &str, plan: &TradePlan, cross: &str) -> fmt::Result {
    writeln!(f, "{title}:")?;
    writeln!(f, "  - entry: after a decisive break {cross} {:.2}", plan.trigger)?;
    writeln!(f, "  - stop: near {:.2}", plan.stop)?;
    writeln!(
        f,
        "  - targets: first {:.2}, second {:.2}",
        plan.target1, plan.target2
    )
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.pivots;
        let d = &self.decision;

        writeln!(
            f,
            "--- {} perpetual {} technical analysis ---",
            self.symbol, self.interval
        )?;
        writeln!(f)?;
        writeln!(f, "Current price: {:.2} USDT", self.current_price)?;
        writeln!(f, "24h change: {:.2}%", self.change_24h_percent)?;
        writeln!(f, "Supports: S2 {:.2} USDT, S1 {:.2} USDT", p.s2, p.s1)?;
        writeln!(f, "Resistances: R1 {:.2} USDT, R2 {:.2} USDT", p.r1, p.r2)?;
        writeln!(f, "Fibonacci retracements:")?;
        for level in &self.fibonacci.levels {
            writeln!(f, "  - {}: {:.2} USDT", level.label(), level.price)?;
        }
        writeln!(f, "Trend: {}", self.trend)?;

        writeln!(f)?;
        writeln!(f, "--- Indicators ---")?;
        let c = &self.commentary;
        writeln!(f, "Moving averages: {}", c.moving_averages)?;
        writeln!(f, "MACD: {}", c.macd)?;
        writeln!(f, "BOLL: {}", c.bollinger)?;
        writeln!(f, "RSI: {}", c.rsi)?;
        writeln!(f, "KDJ: {}", c.kdj)?;

        writeln!(f)?;
        writeln!(f, "--- Funding and volume ---")?;
        writeln!(f, "Funding rate: {}", c.funding)?;
        writeln!(f, "Volume: {}", c.volume)?;
        writeln!(f, "Candle: {}", self.candle)?;

        writeln!(f)?;
        writeln!(f, "--- Result ---")?;
        writeln!(f, "Composite score: {:.2}", self.score.total)?;
        for term in &self.score.contributions {
            writeln!(f, "  {:+.2}  {}: {}", term.points, term.source, term.note)?;
        }
        if self.reversal.is_empty() {
            writeln!(f, "Reversal patterns: none")?;
        } else {
            writeln!(f, "Reversal patterns (net {:.2}):", self.reversal.score)?;
            for hit in &self.reversal.hits {
                writeln!(f, " - {}", hit.name())?;
            }
        }
        writeln!(f, "Direction: {}", d.direction)?;
        writeln!(f, "Entry: {}", d.entry)?;

        match (d.direction, &d.range_plan) {
            (Direction::Ranging, Some(plan)) => {
                writeln!(f)?;
                writeln!(f, "--- Range trading plan ---")?;
                write_trade_plan(f, "Long", &plan.long, "above")?;
                write_trade_plan(f, "Short", &plan.short, "below")?;
            }
            _ => {
                writeln!(
                    f,
                    "Stop loss: {:.2}, about {:.2}% risk",
                    d.stop_loss, d.risk_percent
                )?;
                writeln!(
                    f,
                    "Targets: first {:.2}, second {:.2}",
                    d.target1, d.target2
                )?;
            }
        }

        write!(f, "For reference only, not investment advice.")
    }
}
