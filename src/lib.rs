//! Candlestick technical-analysis reports for perpetual futures.
//!
//! Fetches recent OHLCV candles, the funding rate and the 24h change from
//! Binance USDⓈ-M futures, then derives an indicator snapshot, candlestick
//! and reversal patterns, pivot and Fibonacci levels and a scored
//! entry/stop/target recommendation.

pub mod analysis;
pub mod config;
pub mod error;
pub mod indicators;
pub mod market;
pub mod models;
pub mod pipeline;
pub mod report;

pub use error::{ChartistError, Result};
