//! Technical indicator primitives.
//!
//! No I/O, no side effects. Every function takes plain `Decimal` price
//! sequences (oldest first) and returns the full output series, oldest
//! first. A series is empty when the input is shorter than the indicator's
//! warm-up, so callers can treat "no value" uniformly.
//!
//! Warm-up lengths:
//! - `sma(period)`, `bollinger(period)`: `period`
//! - `ema(period)`: `period` (seeded with the SMA of the first `period` values)
//! - `rsi(period)`: `period + 1`
//! - `stochastic(period, signal)`: `period + signal - 1`
//! - `adx(period)`: `2 * period`
//! - `macd(fast, slow, signal)`: `slow + signal - 1`
//!
//! References:
//!     Wilder (1978), "New Concepts in Technical Trading Systems".
//!     Appel (1979), "The Moving Average Convergence-Divergence Method".
//!     Lane (1984), "Lane's Stochastics".

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::Serialize;

/// One MACD observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacdPoint {
    /// EMA(fast) − EMA(slow).
    pub line: Decimal,
    /// EMA(signal) of the line.
    pub signal: Decimal,
    pub histogram: Decimal,
}

/// One Bollinger Band observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BollingerPoint {
    pub upper: Decimal,
    pub middle: Decimal,
    pub lower: Decimal,
}

/// One stochastic oscillator observation, both lines in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StochasticPoint {
    pub k: Decimal,
    pub d: Decimal,
}

/// One ADX observation with its directional indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdxPoint {
    pub adx: Decimal,
    pub plus_di: Decimal,
    pub minus_di: Decimal,
}

/// Simple moving average.
pub fn sma(values: &[Decimal], period: usize) -> Vec<Decimal> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let period_d = Decimal::from(period as u64);
    values
        .windows(period)
        .map(|w| w.iter().copied().sum::<Decimal>() / period_d)
        .collect()
}

/// Exponential moving average, `k = 2 / (period + 1)`.
///
/// The first value is the SMA of the first `period` inputs.
pub fn ema(values: &[Decimal], period: usize) -> Vec<Decimal> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let k = dec!(2) / Decimal::from(period as u64 + 1);
    let one_minus_k = Decimal::ONE - k;
    let seed = values[..period].iter().copied().sum::<Decimal>() / Decimal::from(period as u64);

    let mut out = Vec::with_capacity(values.len() - period + 1);
    let mut prev = seed;
    out.push(seed);
    for &v in &values[period..] {
        prev = v * k + prev * one_minus_k;
        out.push(prev);
    }
    out
}

/// Moving Average Convergence Divergence.
///
/// Only observations with a defined signal line are returned.
pub fn macd(values: &[Decimal], fast: usize, slow: usize, signal: usize) -> Vec<MacdPoint> {
    if fast == 0 || fast >= slow || signal == 0 || values.len() < slow + signal - 1 {
        return Vec::new();
    }

    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);

    // fast_ema starts at index fast-1, slow_ema at slow-1; align on the latter.
    let offset = slow - fast;
    let line: Vec<Decimal> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, s)| fast_ema[i + offset] - s)
        .collect();

    let signal_ema = ema(&line, signal);
    let skip = line.len() - signal_ema.len();
    line[skip..]
        .iter()
        .zip(&signal_ema)
        .map(|(&l, &s)| MacdPoint {
            line: l,
            signal: s,
            histogram: l - s,
        })
        .collect()
}

/// Bollinger Bands around an SMA, `std_mult` population standard deviations wide.
pub fn bollinger(values: &[Decimal], period: usize, std_mult: Decimal) -> Vec<BollingerPoint> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let period_d = Decimal::from(period as u64);

    values
        .windows(period)
        .map(|w| {
            let middle = w.iter().copied().sum::<Decimal>() / period_d;
            let variance = w
                .iter()
                .map(|&p| {
                    let diff = p - middle;
                    diff * diff
                })
                .sum::<Decimal>()
                / period_d;
            let std_dev = variance.sqrt().unwrap_or(Decimal::ZERO);
            BollingerPoint {
                upper: middle + std_mult * std_dev,
                middle,
                lower: middle - std_mult * std_dev,
            }
        })
        .collect()
}

/// Relative Strength Index with Wilder's smoothing.
pub fn rsi(values: &[Decimal], period: usize) -> Vec<Decimal> {
    if period == 0 || values.len() < period + 1 {
        return Vec::new();
    }

    let period_d = Decimal::from(period as u64);
    let period_minus_1 = Decimal::from(period as u64 - 1);
    let changes: Vec<Decimal> = values.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = changes[..period]
        .iter()
        .map(|&c| c.max(Decimal::ZERO))
        .sum::<Decimal>()
        / period_d;
    let mut avg_loss = changes[..period]
        .iter()
        .map(|&c| (-c).max(Decimal::ZERO))
        .sum::<Decimal>()
        / period_d;

    let mut out = Vec::with_capacity(changes.len() - period + 1);
    out.push(rsi_value(avg_gain, avg_loss));

    for &c in &changes[period..] {
        let gain = c.max(Decimal::ZERO);
        let loss = (-c).max(Decimal::ZERO);
        avg_gain = (avg_gain * period_minus_1 + gain) / period_d;
        avg_loss = (avg_loss * period_minus_1 + loss) / period_d;
        out.push(rsi_value(avg_gain, avg_loss));
    }
    out
}

fn rsi_value(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss.is_zero() {
        // Flat series reads as neutral, pure gains as fully overbought.
        return if avg_gain.is_zero() { dec!(50) } else { dec!(100) };
    }
    let rs = avg_gain / avg_loss;
    dec!(100) - dec!(100) / (Decimal::ONE + rs)
}

/// Stochastic oscillator: `%K` over `period` bars, `%D` the SMA of `%K`.
///
/// A window whose high equals its low yields `%K = 50`.
pub fn stochastic(
    high: &[Decimal],
    low: &[Decimal],
    close: &[Decimal],
    period: usize,
    signal: usize,
) -> Vec<StochasticPoint> {
    let n = close.len();
    if period == 0 || signal == 0 || high.len() != n || low.len() != n || n < period + signal - 1 {
        return Vec::new();
    }

    let k_line: Vec<Decimal> = (period - 1..n)
        .map(|i| {
            let start = i + 1 - period;
            let highest = high[start..=i].iter().copied().max().unwrap_or(Decimal::ZERO);
            let lowest = low[start..=i].iter().copied().min().unwrap_or(Decimal::ZERO);
            let span = highest - lowest;
            if span.is_zero() {
                dec!(50)
            } else {
                dec!(100) * (close[i] - lowest) / span
            }
        })
        .collect();

    let d_line = sma(&k_line, signal);
    let skip = k_line.len() - d_line.len();
    k_line[skip..]
        .iter()
        .zip(&d_line)
        .map(|(&k, &d)| StochasticPoint { k, d })
        .collect()
}

/// Average Directional Index with Wilder's smoothing.
///
/// 1. `+DM`, `-DM` and true range from consecutive bars
/// 2. First smoothed values are plain sums over `period` bars, then
///    `S = S - S / period + x`
/// 3. `±DI = 100 * S(±DM) / S(TR)`, `DX = 100 * |+DI - -DI| / (+DI + -DI)`
/// 4. ADX seeds with the mean of the first `period` DX values, then
///    `ADX = (ADX * (period - 1) + DX) / period`
pub fn adx(high: &[Decimal], low: &[Decimal], close: &[Decimal], period: usize) -> Vec<AdxPoint> {
    let n = close.len();
    if period == 0 || high.len() != n || low.len() != n || n < 2 * period {
        return Vec::new();
    }

    let period_d = Decimal::from(period as u64);
    let period_minus_1 = Decimal::from(period as u64 - 1);

    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    let mut true_range = Vec::with_capacity(n - 1);
    for i in 1..n {
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        plus_dm.push(if up > down && up > Decimal::ZERO { up } else { Decimal::ZERO });
        minus_dm.push(if down > up && down > Decimal::ZERO { down } else { Decimal::ZERO });
        true_range.push(
            (high[i] - low[i])
                .max((high[i] - close[i - 1]).abs())
                .max((low[i] - close[i - 1]).abs()),
        );
    }

    let mut s_plus: Decimal = plus_dm[..period].iter().copied().sum();
    let mut s_minus: Decimal = minus_dm[..period].iter().copied().sum();
    let mut s_tr: Decimal = true_range[..period].iter().copied().sum();

    let mut directional = Vec::with_capacity(plus_dm.len() - period + 1);
    directional.push(directional_index(s_plus, s_minus, s_tr));
    for i in period..plus_dm.len() {
        s_plus = s_plus - s_plus / period_d + plus_dm[i];
        s_minus = s_minus - s_minus / period_d + minus_dm[i];
        s_tr = s_tr - s_tr / period_d + true_range[i];
        directional.push(directional_index(s_plus, s_minus, s_tr));
    }

    let mut adx_value = directional[..period]
        .iter()
        .map(|(_, _, dx)| *dx)
        .sum::<Decimal>()
        / period_d;

    let mut out = Vec::with_capacity(directional.len() - period + 1);
    let (p, m, _) = directional[period - 1];
    out.push(AdxPoint {
        adx: adx_value,
        plus_di: p,
        minus_di: m,
    });
    for &(p, m, dx) in &directional[period..] {
        adx_value = (adx_value * period_minus_1 + dx) / period_d;
        out.push(AdxPoint {
            adx: adx_value,
            plus_di: p,
            minus_di: m,
        });
    }
    out
}

/// Returns `(+DI, -DI, DX)` from smoothed sums; zero when undefined.
fn directional_index(s_plus: Decimal, s_minus: Decimal, s_tr: Decimal) -> (Decimal, Decimal, Decimal) {
    if s_tr.is_zero() {
        return (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
    }
    let plus_di = dec!(100) * s_plus / s_tr;
    let minus_di = dec!(100) * s_minus / s_tr;
    let di_sum = plus_di + minus_di;
    let dx = if di_sum.is_zero() {
        Decimal::ZERO
    } else {
        dec!(100) * (plus_di - minus_di).abs() / di_sum
    };
    (plus_di, minus_di, dx)
}
