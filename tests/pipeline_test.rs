//! End-to-end pipeline runs against an in-memory market data source.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use chartist::ChartistError;
use chartist::analysis::config::AnalysisConfig;
use chartist::analysis::levels::PivotLevels;
use chartist::analysis::strategy::Direction;
use chartist::models::{AnalysisRequest, Interval};
use chartist::pipeline::run_analysis;

use common::{InMemorySource, sideways, trending};

fn request() -> AnalysisRequest {
    AnalysisRequest::new("BTCUSDT", Interval::FifteenMinutes).unwrap()
}

#[tokio::test]
async fn test_full_run_produces_report() {
    let source = InMemorySource::new(trending(200, dec!(100), dec!(1)));
    let report = run_analysis(&source, &request(), 200, &AnalysisConfig::default())
        .await
        .expect("analysis failed");

    assert_eq!(report.symbol, "BTCUSDT");
    assert_eq!(report.current_price, source.candles[199].close);
    assert_eq!(report.change_24h_percent, dec!(1.25));
    assert_eq!(report.funding_rate_percent, dec!(0.005));
    assert_eq!(report.pivots, PivotLevels::new(dec!(110), dec!(90), dec!(104)));

    let sum: Decimal = report.score.contributions.iter().map(|c| c.points).sum();
    assert_eq!(sum, report.score.total);
    assert_eq!(report.decision.composite_score, report.score.total);
    assert_eq!(report.decision.direction, Direction::from_score(report.score.total));
}

#[tokio::test]
async fn test_kline_limit_trims_history() {
    let source = InMemorySource::new(trending(300, dec!(100), dec!(1)));
    let report = run_analysis(&source, &request(), 50, &AnalysisConfig::default())
        .await
        .unwrap();
    // Fibonacci spans the fetched window only.
    let window = &source.candles[250..];
    let low = window.iter().map(|c| c.low).min().unwrap();
    assert_eq!(report.fibonacci.low, low);
}

#[tokio::test]
async fn test_funding_outage_degrades_to_zero() {
    let mut source = InMemorySource::new(sideways(120, dec!(100)));
    source.funding_percent = None;
    let report = run_analysis(&source, &request(), 120, &AnalysisConfig::default())
        .await
        .expect("funding failure must not abort the run");

    assert_eq!(report.funding_rate_percent, Decimal::ZERO);
    let funding = report
        .score
        .contributions
        .iter()
        .find(|c| c.source == "funding rate")
        .unwrap();
    assert_eq!(funding.points, Decimal::ZERO);
}

#[tokio::test]
async fn test_primary_fetch_failure_aborts() {
    let mut source = InMemorySource::new(trending(100, dec!(100), dec!(1)));
    source.fail_candles = true;
    let err = run_analysis(&source, &request(), 100, &AnalysisConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ChartistError::DataFetch { .. }));
}

#[tokio::test]
async fn test_too_few_candles_aborts() {
    let source = InMemorySource::new(trending(20, dec!(100), dec!(1)));
    let err = run_analysis(&source, &request(), 200, &AnalysisConfig::default())
        .await
        .unwrap_err();
    match err {
        ChartistError::InsufficientData {
            required,
            available,
            ..
        } => {
            assert_eq!(required, 34);
            assert_eq!(available, 20);
        }
        other => panic!("expected InsufficientData, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_previous_day_aborts() {
    let mut source = InMemorySource::new(trending(100, dec!(100), dec!(1)));
    source.daily.truncate(1);
    let err = run_analysis(&source, &request(), 100, &AnalysisConfig::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("daily pivots"));
}

#[tokio::test]
async fn test_fib_window_config_is_honoured() {
    let source = InMemorySource::new(trending(120, dec!(100), dec!(1)));
    let config = AnalysisConfig {
        fib_window: Some(10),
        ..AnalysisConfig::default()
    };
    let report = run_analysis(&source, &request(), 120, &config).await.unwrap();
    let window = &source.candles[110..];
    assert_eq!(report.fibonacci.high, window.iter().map(|c| c.high).max().unwrap());
    assert_eq!(report.fibonacci.low, window.iter().map(|c| c.low).min().unwrap());
}

#[test]
fn test_identical_runs_are_identical() {
    let source = InMemorySource::new(sideways(150, dec!(250)));
    let config = AnalysisConfig::default();
    let first = tokio_test::block_on(run_analysis(&source, &request(), 150, &config)).unwrap();
    let second = tokio_test::block_on(run_analysis(&source, &request(), 150, &config)).unwrap();
    assert_eq!(first, second);
}
