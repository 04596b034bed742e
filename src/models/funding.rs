//! Mark price and funding rate (`/fapi/v1/premiumIndex`).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Premium index snapshot for a perpetual contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumIndex {
    pub symbol: String,
    pub mark_price: Decimal,
    /// Funding rate as a fraction, e.g. `0.0001` for 0.01 %.
    pub last_funding_rate: Decimal,
    pub next_funding_time: i64,
}

impl PremiumIndex {
    /// The funding rate expressed in percent.
    pub fn funding_rate_percent(&self) -> Decimal {
        self.last_funding_rate * dec!(100)
    }
}
