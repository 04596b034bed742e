//! Application configuration loaded from environment variables.
//!
//! All variables are optional:
//! - `BINANCE_FUTURES_URL`: REST base URL for USDⓈ-M futures
//! - `CHARTIST_KLINE_LIMIT`: candles fetched per run (34..=1500)
//! - `CHARTIST_HTTP_TIMEOUT_SECS`: per-request timeout
//! - `CHARTIST_MAX_RETRIES`: retries after a transient failure
//!
//! Empty values are treated as unset.

use std::str::FromStr;
use std::time::Duration;

use crate::ChartistError;

/// Default public REST endpoint.
const DEFAULT_FUTURES_URL: &str = "https://fapi.binance.com";

const DEFAULT_KLINE_LIMIT: usize = 200;

/// MACD(12,26,9) is the longest indicator warm-up.
pub const MIN_KLINE_LIMIT: usize = 34;

/// Binance caps `/fapi/v1/klines` at 1500 rows.
pub const MAX_KLINE_LIMIT: usize = 1500;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub binance: BinanceConfig,
    /// Primary-interval candles requested per run.
    pub kline_limit: usize,
}

/// Binance-specific configuration values.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FUTURES_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`ChartistError::Config`] if a variable does not parse or the
/// kline limit is outside `34..=1500`.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let base_url = non_empty_var("BINANCE_FUTURES_URL")
        .unwrap_or_else(|| DEFAULT_FUTURES_URL.to_string())
        .trim_end_matches('/')
        .to_string();

    let kline_limit = parse_var("CHARTIST_KLINE_LIMIT", DEFAULT_KLINE_LIMIT)?;
    if !(MIN_KLINE_LIMIT..=MAX_KLINE_LIMIT).contains(&kline_limit) {
        return Err(ChartistError::Config(format!(
            "CHARTIST_KLINE_LIMIT must be between {MIN_KLINE_LIMIT} and {MAX_KLINE_LIMIT}, got {kline_limit}"
        )));
    }

    let timeout_secs: u64 = parse_var("CHARTIST_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
    if timeout_secs == 0 {
        return Err(ChartistError::Config(
            "CHARTIST_HTTP_TIMEOUT_SECS must be positive".to_string(),
        ));
    }
    let max_retries = parse_var("CHARTIST_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;

    Ok(AppConfig {
        binance: BinanceConfig {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
        },
        kline_limit,
    })
}

/// Parses a variable, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> crate::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ChartistError::Config(format!("invalid {name}={raw:?}: {e}"))),
        None => Ok(default),
    }
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
