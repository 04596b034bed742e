//! Reversal aggregator: runs the pattern library over a trailing window,
//! nets the hit weights and drops hits that contradict the net direction.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::Bias;
use super::patterns::{PatternHit, PatternKind};
use crate::models::Candle;

/// Surviving pattern hits and the raw net score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReversalSummary {
    /// Hits left after suppression, in detection order.
    pub hits: Vec<PatternHit>,
    /// Sum of every hit's weight, taken before suppression.
    pub score: Decimal,
}

impl ReversalSummary {
    pub fn names(&self) -> Vec<&'static str> {
        self.hits.iter().map(PatternHit::name).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Runs every detector against `window` and returns the raw hit list.
pub fn detect_all(window: &[Candle]) -> Vec<PatternHit> {
    PatternKind::ALL
        .iter()
        .filter(|kind| kind.detect(window))
        .map(|&kind| PatternHit::from(kind))
        .collect()
}

/// Drops hits whose bias opposes the sign of `score`. A zero score keeps
/// everything.
pub fn suppress_contradictions(hits: Vec<PatternHit>, score: Decimal) -> Vec<PatternHit> {
    let dropped = if score > Decimal::ZERO {
        Bias::Bearish
    } else if score < Decimal::ZERO {
        Bias::Bullish
    } else {
        return hits;
    };
    hits.into_iter().filter(|h| h.bias != dropped).collect()
}

/// Detects, scores and filters reversal patterns over `window`.
pub fn summarize(window: &[Candle]) -> ReversalSummary {
    let raw = detect_all(window);
    let score: Decimal = raw.iter().map(|h| h.weight).sum();
    let detected = raw.len();
    let hits = suppress_contradictions(raw, score);

    debug!(
        detected,
        kept = hits.len(),
        score = %score,
        "reversal patterns evaluated"
    );

    ReversalSummary { hits, score }
}
