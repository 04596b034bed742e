//! Binance USDⓈ-M futures REST client.
//!
//! Public market-data endpoints only, no authentication:
//! - `/fapi/v1/klines`
//! - `/fapi/v1/premiumIndex`
//! - `/fapi/v1/ticker/24hr`
//!
//! Rate limiting (HTTP 429), server errors and transport timeouts are
//! retried with exponential backoff; other 4xx responses are returned
//! immediately as [`ChartistError::Rejected`].

use std::time::Duration;

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::MarketDataSource;
use crate::config::BinanceConfig;
use crate::models::candle::parse_klines;
use crate::models::funding::PremiumIndex;
use crate::models::ticker::Ticker24h;
use crate::models::{Candle, Interval};
use crate::{ChartistError, Result};

/// Initial backoff duration between retries.
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Maximum backoff duration between retries.
const MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Longest error body kept in a [`ChartistError::Rejected`].
const MAX_ERROR_BODY: usize = 256;

/// HTTP client for the Binance futures market-data API.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    http: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl BinanceClient {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ChartistError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &BinanceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("chartist/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        })
    }

    /// Fetches the most recent `limit` klines for `symbol`.
    pub async fn klines(&self, symbol: &str, interval: Interval, limit: usize) -> Result<Vec<Candle>> {
        let body = self
            .get(
                "klines",
                "/fapi/v1/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        parse_klines(&body)
    }

    pub async fn premium_index(&self, symbol: &str) -> Result<PremiumIndex> {
        self.get_json(
            "premium index",
            "/fapi/v1/premiumIndex",
            &[("symbol", symbol.to_string())],
        )
        .await
    }

    pub async fn ticker_24h(&self, symbol: &str) -> Result<Ticker24h> {
        self.get_json(
            "24h ticker",
            "/fapi/v1/ticker/24hr",
            &[("symbol", symbol.to_string())],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let body = self.get(resource, path, query).await?;
        serde_json::from_str(&body).map_err(|e| {
            ChartistError::MalformedResponse(format!("{resource}: {e}"))
        })
    }

    /// GET with retry. Transient failures back off exponentially up to
    /// `max_retries` times.
    async fn get(&self, resource: &'static str, path: &str, query: &[(&str, String)]) -> Result<String> {
        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 0;
        loop {
            match self.get_once(resource, path, query).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        resource,
                        attempt,
                        backoff = ?backoff,
                        "Request failed, backing off before retry: {e}"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = next_backoff(backoff);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once(&self, resource: &'static str, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{path}", self.base_url);
        debug!(resource, %url, "GET");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(ChartistError::DataFetch {
                resource: resource.to_string(),
                reason: format!("HTTP {status}"),
            });
        }
        Err(ChartistError::Rejected {
            resource: resource.to_string(),
            status: status.as_u16(),
            body: truncate(body, MAX_ERROR_BODY),
        })
    }
}

/// Doubles `current`, capped at [`MAX_BACKOFF`].
fn next_backoff(current: Duration) -> Duration {
    current.saturating_mul(2).min(MAX_BACKOFF)
}

fn truncate(mut s: String, max: usize) -> String {
    if s.len() > max {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
    }
    s
}

impl MarketDataSource for BinanceClient {
    async fn candles(&self, symbol: &str, interval: Interval, limit: usize) -> Result<Vec<Candle>> {
        self.klines(symbol, interval, limit).await
    }

    async fn funding_rate(&self, symbol: &str) -> Result<Decimal> {
        Ok(self.premium_index(symbol).await?.funding_rate_percent())
    }

    async fn price_change_24h(&self, symbol: &str) -> Result<Decimal> {
        Ok(self.ticker_24h(symbol).await?.price_change_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = BinanceClient::new(&BinanceConfig {
            base_url: "http://localhost:1/".into(),
            ..BinanceConfig::default()
        })
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:1");
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let mut backoff = INITIAL_BACKOFF;
        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(backoff);
            backoff = next_backoff(backoff);
        }
        assert_eq!(
            seen,
            [500, 1000, 2000, 4000, 8000, 8000, 8000].map(Duration::from_millis)
        );
        assert_eq!(next_backoff(Duration::MAX), MAX_BACKOFF);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("abcdef".into(), 4), "abcd");
        assert_eq!(truncate("ééé".into(), 3), "é");
        assert_eq!(truncate("ok".into(), 10), "ok");
    }
}
