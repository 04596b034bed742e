//! Market data retrieval.
//!
//! [`MarketDataSource`] is the seam between the analysis pipeline and the
//! exchange. [`binance::BinanceClient`] is the production implementation;
//! tests substitute in-memory sources.

pub mod binance;

use std::future::Future;

use rust_decimal::Decimal;

use crate::Result;
use crate::models::{Candle, Interval};

pub use binance::BinanceClient;

/// Source of candles, funding rate and 24h change for one symbol.
pub trait MarketDataSource {
    /// The most recent `limit` candles, oldest first.
    fn candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Candle>>> + Send;

    /// Latest funding rate in percent (`0.01` means 0.01 %).
    fn funding_rate(&self, symbol: &str) -> impl Future<Output = Result<Decimal>> + Send;

    /// Rolling 24h price change in percent.
    fn price_change_24h(&self, symbol: &str) -> impl Future<Output = Result<Decimal>> + Send;
}
