//! 24-hour rolling ticker statistics (`/fapi/v1/ticker/24hr`).

use rust_decimal::Decimal;
use serde::Deserialize;

/// 24h price statistics for one symbol. Binance sends numbers as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24h {
    pub symbol: String,
    pub price_change: Decimal,
    /// Already a percentage, e.g. `1.57` for +1.57 %.
    pub price_change_percent: Decimal,
    pub last_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub volume: Decimal,
}
