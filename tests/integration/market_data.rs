//! Exchange klines client against a mocked REST endpoint

use fusetrade::config::MarketDataConfig;
use fusetrade::error::MarketDataError;
use fusetrade::models::credentials::MarketDataCredentials;
use fusetrade::services::market_data::binance::is_spot_usdt_pair;
use fusetrade::services::market_data::{
    BinanceMarketDataProvider, MarketDataProvider, MockMarketDataProvider, Provenance,
};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KLINES: &str = "/api/v3/klines";
const HOUR_MS: i64 = 3_600_000;

fn provider(server: &MockServer) -> BinanceMarketDataProvider {
    BinanceMarketDataProvider::new(
        reqwest::Client::new(),
        MarketDataConfig {
            base_url: server.uri(),
            timeout: Duration::from_millis(2_000),
            ..MarketDataConfig::default()
        },
    )
}

/// Rows shaped like the exchange payload: prices as strings, times in ms.
fn kline_rows(count: usize) -> Value {
    let start = 1_709_251_200_000_i64;
    let rows: Vec<Value> = (0..count)
        .map(|i| {
            let close = 100.0 + i as f64;
            json!([
                start + i as i64 * HOUR_MS,
                format!("{:.2}", close - 0.5),
                format!("{:.2}", close + 1.0),
                format!("{:.2}", close - 1.0),
                format!("{:.2}", close),
                "12.5",
                start + (i as i64 + 1) * HOUR_MS - 1,
                "1250.0",
                42,
                "6.0",
                "600.0",
                "0"
            ])
        })
        .collect();
    Value::Array(rows)
}

#[tokio::test]
async fn test_public_fetch_parses_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(KLINES))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "1h"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kline_rows(3)))
        .expect(1)
        .mount(&server)
        .await;

    let feed = provider(&server)
        .fetch_candles("BTCUSDT", "1h", 3, None)
        .await;
    assert_eq!(feed.provenance, Provenance::Public);
    assert_eq!(feed.candles.len(), 3);

    let first = &feed.candles[0];
    assert_eq!(first.open, 99.5);
    assert_eq!(first.high, 101.0);
    assert_eq!(first.low, 99.0);
    assert_eq!(first.close, 100.0);
    assert_eq!(first.volume, 12.5);
    assert_eq!(first.open_time.timestamp_millis(), 1_709_251_200_000);
}

#[tokio::test]
async fn test_credentials_are_forwarded_and_mark_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(KLINES))
        .and(header("X-MBX-APIKEY", "mbx-user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kline_rows(5)))
        .expect(1)
        .mount(&server)
        .await;

    let creds = MarketDataCredentials::new("mbx-user", "secret");
    let feed = provider(&server)
        .fetch_candles("ETHUSDT", "1h", 5, Some(&creds))
        .await;
    assert_eq!(feed.provenance, Provenance::Authenticated);
    assert_eq!(feed.candles.len(), 5);
}

#[tokio::test]
async fn test_blank_credentials_count_as_public() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(KLINES))
        .respond_with(ResponseTemplate::new(200).set_body_json(kline_rows(2)))
        .mount(&server)
        .await;

    let creds = MarketDataCredentials::new("  ", "");
    let feed = provider(&server)
        .fetch_candles("ETHUSDT", "1h", 2, Some(&creds))
        .await;
    assert_eq!(feed.provenance, Provenance::Public);
}

#[tokio::test]
async fn test_server_error_falls_back_to_mock_series() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(KLINES))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let creds = MarketDataCredentials::new("mbx-user", "secret");
    let feed = provider(&server)
        .fetch_candles("SOLUSDT", "1h", 150, Some(&creds))
        .await;
    assert_eq!(feed.provenance, Provenance::Mock);
    assert_eq!(feed.candles.len(), 150);
    assert_eq!(
        feed.candles,
        MockMarketDataProvider::new().generate("SOLUSDT", "1h", 150)
    );

    let err = provider(&server)
        .fetch_klines("SOLUSDT", "1h", 150, None)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Status(500)), "{:?}", err);
}

#[tokio::test]
async fn test_garbage_payload_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(KLINES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([["not", "a", "kline"]])))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch_klines("BTCUSDT", "1h", 10, None)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Decode(_)), "{:?}", err);

    let feed = provider(&server)
        .fetch_candles("BTCUSDT", "1h", 10, None)
        .await;
    assert_eq!(feed.provenance, Provenance::Mock);
    assert_eq!(feed.candles.len(), 10);
}

#[tokio::test]
async fn test_empty_payload_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(KLINES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch_klines("BTCUSDT", "1h", 10, None)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Decode(_)), "{:?}", err);
}

const TICKERS: &str = "/api/v3/ticker/24hr";

fn ticker(symbol: &str, price: &str, quote_volume: &str) -> Value {
    json!({
        "symbol": symbol,
        "priceChange": "1.00",
        "priceChangePercent": "2.50",
        "lastPrice": price,
        "volume": "1000.0",
        "quoteVolume": quote_volume,
        "count": 1200
    })
}

#[tokio::test]
async fn test_top_coins_filter_and_rank_by_quote_volume() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TICKERS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            ticker("ETHUSDT", "2300.5", "500000.0"),
            ticker("BTCUSDT", "43000.0", "900000.0"),
            ticker("BTCUPUSDT", "12.0", "990000.0"),
            ticker("ETHBTC", "0.05", "800000.0"),
            ticker("SOLUSDT", "98.0", "700000.0"),
            ticker("XRPBEARUSDT", "0.1", "950000.0")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let feed = provider(&server).top_coins(2, None).await;
    assert_eq!(feed.provenance, Provenance::Public);
    let symbols: Vec<&str> = feed.coins.iter().map(|c| c.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTCUSDT", "SOLUSDT"]);
    assert_eq!(feed.coins[0].price, 43_000.0);
    assert_eq!(feed.coins[0].change_24h, 2.5);
    assert_eq!(feed.coins[0].quote_volume, 900_000.0);
}

#[tokio::test]
async fn test_top_coins_with_credentials_are_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TICKERS))
        .and(header("X-MBX-APIKEY", "mbx-user"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([ticker("BTCUSDT", "1.0", "2.0")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let creds = MarketDataCredentials::new("mbx-user", "secret");
    let feed = provider(&server).top_coins(10, Some(&creds)).await;
    assert_eq!(feed.provenance, Provenance::Authenticated);
    assert_eq!(feed.coins.len(), 1);
}

#[tokio::test]
async fn test_top_coins_fall_back_to_sample_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TICKERS))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let feed = provider(&server).top_coins(4, None).await;
    assert_eq!(feed.provenance, Provenance::Mock);
    assert_eq!(feed.coins, MockMarketDataProvider::new().sample_top_coins(4));
}

#[tokio::test]
async fn test_top_coins_non_numeric_ticker_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TICKERS))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([ticker("BTCUSDT", "n/a", "2.0")])),
        )
        .mount(&server)
        .await;

    let err = provider(&server).fetch_top_coins(10, None).await.unwrap_err();
    assert!(matches!(err, MarketDataError::Decode(_)), "{:?}", err);
}

#[test]
fn test_spot_usdt_pair_filter() {
    assert!(is_spot_usdt_pair("BTCUSDT"));
    assert!(!is_spot_usdt_pair("USDT"));
    assert!(!is_spot_usdt_pair("ETHBTC"));
    assert!(!is_spot_usdt_pair("ETHUPUSDT"));
    assert!(!is_spot_usdt_pair("ETHDOWNUSDT"));
    assert!(!is_spot_usdt_pair("BULLUSDT"));
}
