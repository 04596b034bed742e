//! Shared test utilities: candle builders, an in-memory market data
//! source and a canned-response HTTP server.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use chartist::market::MarketDataSource;
use chartist::models::{Candle, Interval};
use chartist::{ChartistError, Result};

pub const KLINES_JSON: &str = include_str!("../fixtures/klines.json");
pub const PREMIUM_INDEX_JSON: &str = include_str!("../fixtures/premium_index.json");
pub const TICKER_24H_JSON: &str = include_str!("../fixtures/ticker_24h.json");
pub const INVALID_SYMBOL_JSON: &str = include_str!("../fixtures/error_invalid_symbol.json");

/// Linear trend: close moves by `step` per bar, every fourth bar pulls
/// back intrabar.
pub fn trending(n: usize, start: Decimal, step: Decimal) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let drift = step * Decimal::from(i as i64);
            let open = start + drift - if i % 4 == 3 { step * dec!(1.5) } else { Decimal::ZERO };
            let close = start + drift + step * dec!(0.8);
            Candle::new(
                i as i64 * 900_000,
                open,
                close.max(open) + dec!(0.3),
                close.min(open) - dec!(0.3),
                close,
                dec!(100),
            )
        })
        .collect()
}

/// Sideways series oscillating around `center`.
pub fn sideways(n: usize, center: Decimal) -> Vec<Candle> {
    let swings = [dec!(0), dec!(1.2), dec!(-0.7), dec!(0.9), dec!(-1.4), dec!(0.3)];
    (0..n)
        .map(|i| {
            let open = center + swings[i % swings.len()];
            let close = center + swings[(i + 1) % swings.len()];
            Candle::new(
                i as i64 * 900_000,
                open,
                open.max(close) + dec!(0.5),
                open.min(close) - dec!(0.5),
                close,
                dec!(100) + Decimal::from((i % 5) as i64 * 10),
            )
        })
        .collect()
}

pub fn daily_pair() -> Vec<Candle> {
    vec![
        Candle::new(0, dec!(98), dec!(110), dec!(90), dec!(104), dec!(5000)),
        Candle::new(86_400_000, dec!(104), dec!(106), dec!(101), dec!(105), dec!(1200)),
    ]
}

/// In-memory market data. `None` for funding simulates an outage.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    pub candles: Vec<Candle>,
    pub daily: Vec<Candle>,
    pub funding_percent: Option<Decimal>,
    pub change_24h_percent: Decimal,
    pub fail_candles: bool,
}

impl InMemorySource {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self {
            candles,
            daily: daily_pair(),
            funding_percent: Some(dec!(0.005)),
            change_24h_percent: dec!(1.25),
            fail_candles: false,
        }
    }
}

fn tail(candles: &[Candle], limit: usize) -> Vec<Candle> {
    candles[candles.len().saturating_sub(limit)..].to_vec()
}

impl MarketDataSource for InMemorySource {
    async fn candles(&self, _symbol: &str, interval: Interval, limit: usize) -> Result<Vec<Candle>> {
        if interval == Interval::OneDay {
            return Ok(tail(&self.daily, limit));
        }
        if self.fail_candles {
            return Err(ChartistError::DataFetch {
                resource: "klines".into(),
                reason: "HTTP 503 Service Unavailable".into(),
            });
        }
        Ok(tail(&self.candles, limit))
    }

    async fn funding_rate(&self, _symbol: &str) -> Result<Decimal> {
        self.funding_percent.ok_or_else(|| ChartistError::DataFetch {
            resource: "premium index".into(),
            reason: "connection reset".into(),
        })
    }

    async fn price_change_24h(&self, _symbol: &str) -> Result<Decimal> {
        Ok(self.change_24h_percent)
    }
}

/// Request lines seen by [`serve`], in arrival order.
pub type RequestLog = Arc<Mutex<Vec<String>>>;

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Serves `responses` in order, one per connection, on a local port.
/// Returns the base URL and a log of request lines.
pub async fn serve(responses: Vec<(u16, String)>) -> (String, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&log);

    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            let request = String::from_utf8_lossy(&buf);
            if let Some(line) = request.lines().next() {
                seen.lock().unwrap().push(line.to_string());
            }
            let response = format!(
                "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                reason(status),
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (base_url, log)
}
