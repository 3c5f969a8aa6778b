//! Binance spot REST klines.

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::mock::MockMarketDataProvider;
use super::{CandleFeed, CoinsFeed, MarketDataProvider, Provenance};
use crate::config::MarketDataConfig;
use crate::error::MarketDataError;
use crate::models::credentials::MarketDataCredentials;
use crate::models::indicators::Candle;
use crate::models::market::CoinSummary;

const API_KEY_HEADER: &str = "X-MBX-APIKEY";
const QUOTE_ASSET: &str = "USDT";
/// Leveraged token markers excluded from the top-coins list.
const LEVERAGED_MARKERS: [&str; 4] = ["UP", "DOWN", "BULL", "BEAR"];

/// One entry of `GET /api/v3/ticker/24hr`. Numbers arrive as strings.
#[derive(Deserialize, Debug)]
struct TickerResponse {
    symbol: String,
    #[serde(rename(deserialize = "lastPrice"))]
    last_price: String,
    #[serde(rename(deserialize = "priceChangePercent"))]
    price_change_percent: String,
    volume: String,
    #[serde(rename(deserialize = "quoteVolume"))]
    quote_volume: String,
}

impl TickerResponse {
    fn to_summary(&self) -> Option<CoinSummary> {
        Some(CoinSummary {
            symbol: self.symbol.clone(),
            price: self.last_price.parse().ok()?,
            change_24h: self.price_change_percent.parse().ok()?,
            volume: self.volume.parse().ok()?,
            quote_volume: self.quote_volume.parse().ok()?,
        })
    }
}

/// USDT-quoted spot pair that is not a leveraged token.
pub fn is_spot_usdt_pair(symbol: &str) -> bool {
    symbol.strip_suffix(QUOTE_ASSET).is_some_and(|base| {
        !base.is_empty() && !LEVERAGED_MARKERS.iter().any(|m| base.contains(m))
    })
}

pub struct BinanceMarketDataProvider {
    client: reqwest::Client,
    config: MarketDataConfig,
    fallback: MockMarketDataProvider,
}

impl BinanceMarketDataProvider {
    pub fn new(client: reqwest::Client, config: MarketDataConfig) -> Self {
        Self {
            client,
            config,
            fallback: MockMarketDataProvider::new(),
        }
    }

    /// Raw `GET /api/v3/klines`. Errors are left to the caller.
    pub async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
        credentials: Option<&MarketDataCredentials>,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let url = format!("{}/api/v3/klines", self.config.base_url);
        let limit = limit.to_string();
        let mut request = self
            .client
            .get(&url)
            .timeout(self.config.timeout)
            .query(&[
                ("symbol", symbol),
                ("interval", interval),
                ("limit", limit.as_str()),
            ]);
        if let Some(creds) = credentials {
            request = request.header(API_KEY_HEADER, creds.api_key.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::Status(status.as_u16()));
        }

        let rows: Vec<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| MarketDataError::Decode(e.to_string()))?;
        if rows.is_empty() {
            return Err(MarketDataError::Decode(format!(
                "no klines returned for {}",
                symbol
            )));
        }

        let mut candles = rows
            .iter()
            .enumerate()
            .map(|(i, row)| parse_kline_row(row).ok_or_else(|| {
                MarketDataError::Decode(format!("row {} is not a valid kline", i))
            }))
            .collect::<Result<Vec<_>, _>>()?;
        candles.sort_by_key(|c| c.open_time);

        Ok(candles)
    }

    /// Raw `GET /api/v3/ticker/24hr`, filtered to spot USDT pairs and ranked
    /// by quote volume.
    pub async fn fetch_top_coins(
        &self,
        limit: usize,
        credentials: Option<&MarketDataCredentials>,
    ) -> Result<Vec<CoinSummary>, MarketDataError> {
        let url = format!("{}/api/v3/ticker/24hr", self.config.base_url);
        let mut request = self.client.get(&url).timeout(self.config.timeout);
        if let Some(creds) = credentials {
            request = request.header(API_KEY_HEADER, creds.api_key.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::Status(status.as_u16()));
        }

        let tickers: Vec<TickerResponse> = response
            .json()
            .await
            .map_err(|e| MarketDataError::Decode(e.to_string()))?;

        let mut coins = tickers
            .iter()
            .filter(|t| is_spot_usdt_pair(&t.symbol))
            .map(|t| {
                t.to_summary().ok_or_else(|| {
                    MarketDataError::Decode(format!("ticker {} has a non-numeric field", t.symbol))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        coins.sort_by(|a, b| b.quote_volume.total_cmp(&a.quote_volume));
        coins.truncate(limit);

        Ok(coins)
    }
}

#[async_trait]
impl MarketDataProvider for BinanceMarketDataProvider {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
        credentials: Option<&MarketDataCredentials>,
    ) -> CandleFeed {
        let credentials = credentials.filter(|c| c.is_usable());

        match self.fetch_klines(symbol, interval, limit, credentials).await {
            Ok(candles) => {
                let provenance = if credentials.is_some() {
                    Provenance::Authenticated
                } else {
                    Provenance::Public
                };
                debug!(
                    symbol = %symbol,
                    count = candles.len(),
                    provenance = provenance.as_str(),
                    "Fetched klines"
                );
                CandleFeed {
                    symbol: symbol.to_string(),
                    candles,
                    provenance,
                }
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Kline fetch failed, using mock candles");
                self.fallback
                    .fetch_candles(symbol, interval, limit, None)
                    .await
            }
        }
    }

    async fn top_coins(
        &self,
        limit: usize,
        credentials: Option<&MarketDataCredentials>,
    ) -> CoinsFeed {
        let credentials = credentials.filter(|c| c.is_usable());

        match self.fetch_top_coins(limit, credentials).await {
            Ok(coins) => CoinsFeed {
                coins,
                provenance: if credentials.is_some() {
                    Provenance::Authenticated
                } else {
                    Provenance::Public
                },
            },
            Err(e) => {
                warn!(error = %e, "Ticker fetch failed, using sample top coins");
                CoinsFeed {
                    coins: self.fallback.sample_top_coins(limit),
                    provenance: Provenance::Mock,
                }
            }
        }
    }
}

/// `[open_time, "open", "high", "low", "close", "volume", close_time, ...]`
fn parse_kline_row(row: &[Value]) -> Option<Candle> {
    if row.len() < 6 {
        return None;
    }
    let open_time = DateTime::from_timestamp_millis(row[0].as_i64()?)?;
    let field = |i: usize| -> Option<f64> {
        match &row[i] {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    };

    Some(Candle::new(
        field(1)?,
        field(2)?,
        field(3)?,
        field(4)?,
        field(5)?,
        open_time,
    ))
}
