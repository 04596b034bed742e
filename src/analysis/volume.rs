//! Volume-versus-price classification for the latest bar.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// How the latest volume qualifies the latest price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeSignal {
    ConfirmedRally,
    ConfirmedSelloff,
    LowVolumeRally,
    LowVolumeDecline,
    ShrinkingBounce,
    ShrinkingDecline,
    Neutral,
}

impl VolumeSignal {
    /// Classifies `volume` against its moving average `average` given the
    /// close-to-close `price_change`. Bands are checked in order.
    pub fn classify(volume: Decimal, average: Decimal, price_change: Decimal) -> Self {
        let up = price_change > Decimal::ZERO;
        let down = price_change < Decimal::ZERO;

        if volume > average * dec!(1.5) {
            if up {
                return Self::ConfirmedRally;
            }
            if down {
                return Self::ConfirmedSelloff;
            }
        }
        if volume < average * dec!(0.5) {
            if up {
                return Self::LowVolumeRally;
            }
            if down {
                return Self::LowVolumeDecline;
            }
        }
        match (up, down, volume < average) {
            (true, _, true) => Self::ShrinkingBounce,
            (_, true, true) => Self::ShrinkingDecline,
            _ => Self::Neutral,
        }
    }

    /// Composite-score contribution before trend weighting. Only the two
    /// confirmed bands count.
    pub fn score(&self) -> Decimal {
        match self {
            Self::ConfirmedRally => Decimal::ONE,
            Self::ConfirmedSelloff => Decimal::NEGATIVE_ONE,
            _ => Decimal::ZERO,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ConfirmedRally => "volume-confirmed rally",
            Self::ConfirmedSelloff => "volume-confirmed selloff",
            Self::LowVolumeRally => "low-volume rally, weak conviction",
            Self::LowVolumeDecline => "low-volume decline, possible exhaustion",
            Self::ShrinkingBounce => "shrinking-volume bounce",
            Self::ShrinkingDecline => "shrinking-volume decline",
            Self::Neutral => "volume roughly average",
        }
    }
}

impl fmt::Display for VolumeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
