//! One descriptive line per indicator for the text report.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::Bias;
use super::snapshot::IndicatorSnapshot;
use super::strategy::funding_bias;
use super::volume::VolumeSignal;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorCommentary {
    pub moving_averages: String,
    pub macd: String,
    pub bollinger: String,
    pub rsi: String,
    pub kdj: String,
    pub funding: String,
    pub volume: String,
}

impl IndicatorCommentary {
    pub fn new(
        snap: &IndicatorSnapshot,
        price: Decimal,
        funding_rate_percent: Decimal,
        funding_threshold: Decimal,
        volume: VolumeSignal,
        latest_volume: Decimal,
    ) -> Self {
        Self {
            moving_averages: moving_averages(snap),
            macd: macd(snap),
            bollinger: bollinger(snap, price),
            rsi: rsi(snap),
            kdj: kdj(snap),
            funding: funding(funding_rate_percent, funding_threshold),
            volume: volume_line(volume, latest_volume, snap.volume_ma20),
        }
    }
}

fn moving_averages(s: &IndicatorSnapshot) -> String {
    let (ma5, ma10, ma20) = (s.ma5, s.ma10, s.ma20);
    match s.ma_alignment() {
        Bias::Bullish => format!(
            "MA5 ({ma5:.2}) above MA10 ({ma10:.2}) and MA20 ({ma20:.2}), bullish alignment, short-term trend firm"
        ),
        Bias::Bearish => format!(
            "MA5 ({ma5:.2}) below MA10 ({ma10:.2}) and MA20 ({ma20:.2}), bearish alignment, short-term trend weak"
        ),
        Bias::Neutral => format!(
            "MA5 ({ma5:.2}), MA10 ({ma10:.2}) and MA20 ({ma20:.2}) tangled, no clear trend"
        ),
    }
}

fn macd(s: &IndicatorSnapshot) -> String {
    let m = &s.macd;
    let (position, cross) = if m.line > m.signal {
        ("above", "golden cross")
    } else {
        ("below", "death cross")
    };
    let side = if m.histogram > Decimal::ZERO {
        "bullish momentum"
    } else {
        "bearish momentum"
    };
    let trend = match s.prev_macd_histogram {
        Some(prev) if m.histogram.abs() > prev.abs() => ", expanding",
        Some(prev) if m.histogram.abs() < prev.abs() => ", contracting",
        _ => "",
    };
    format!(
        "DIF ({:.2}) {position} DEA ({:.2}), {cross}; histogram {:.2}, {side}{trend}",
        m.line, m.signal, m.histogram
    )
}

fn bollinger(s: &IndicatorSnapshot, price: Decimal) -> String {
    let b = &s.boll;
    let side = if price > b.middle { "above" } else { "below" };
    let state = if price > b.upper {
        "broke the upper band, strong upside momentum"
    } else if price < b.lower {
        "broke the lower band, strong downside momentum"
    } else {
        "trading inside the bands"
    };
    format!("price {side} the middle band ({:.2}), {state}", b.middle)
}

fn rsi_zone(value: Decimal) -> &'static str {
    if value > dec!(70) {
        "overbought"
    } else if value < dec!(30) {
        "oversold"
    } else {
        "neutral"
    }
}

fn rsi(s: &IndicatorSnapshot) -> String {
    format!(
        "RSI6 {:.2} {}, RSI14 {:.2} {}",
        s.rsi6,
        rsi_zone(s.rsi6),
        s.rsi14,
        rsi_zone(s.rsi14)
    )
}

fn kdj(s: &IndicatorSnapshot) -> String {
    let k = &s.kdj;
    let cross = if k.k > k.d { "golden cross" } else { "death cross" };
    let zone = if k.j > dec!(80) {
        "overbought"
    } else if k.j < dec!(20) {
        "oversold"
    } else {
        "neutral"
    };
    format!("K {:.2} / D {:.2} {cross}, J {:.2} {zone}", k.k, k.d, k.j)
}

fn funding(rate: Decimal, threshold: Decimal) -> String {
    let side = match funding_bias(rate, threshold) {
        Bias::Bearish => "longs pay",
        Bias::Bullish => "shorts pay",
        Bias::Neutral => "neutral",
    };
    format!("{rate:.6}% ({side})")
}

fn volume_line(signal: VolumeSignal, latest: Decimal, average: Decimal) -> String {
    match signal {
        VolumeSignal::Neutral => format!(
            "current volume {latest:.2} in line with the 20-period average {average:.2}"
        ),
        other => other.description().to_string(),
    }
}
