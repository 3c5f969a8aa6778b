//! Market data provider interface.
//!
//! Providers never fail: a live source that cannot answer degrades to the
//! deterministic mock series and says so through [`Provenance`].

pub mod binance;
pub mod mock;

use async_trait::async_trait;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::models::credentials::MarketDataCredentials;
use crate::models::indicators::Candle;
use crate::models::market::CoinSummary;

pub use binance::BinanceMarketDataProvider;
pub use mock::MockMarketDataProvider;

/// Where a candle sequence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Exchange data fetched with the caller's own credentials.
    Authenticated,
    /// Exchange data fetched anonymously.
    Public,
    Mock,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Authenticated => "authenticated",
            Provenance::Public => "public",
            Provenance::Mock => "mock",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CandleFeed {
    pub symbol: String,
    pub candles: Vec<Candle>,
    pub provenance: Provenance,
}

#[derive(Debug, Clone)]
pub struct CoinsFeed {
    pub coins: Vec<CoinSummary>,
    pub provenance: Provenance,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Oldest-first candles for `symbol`, at most `limit` of them.
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
        credentials: Option<&MarketDataCredentials>,
    ) -> CandleFeed;

    /// Most traded USDT pairs, highest quote volume first, at most `limit`.
    async fn top_coins(
        &self,
        limit: usize,
        _credentials: Option<&MarketDataCredentials>,
    ) -> CoinsFeed {
        CoinsFeed {
            coins: MockMarketDataProvider::new().sample_top_coins(limit),
            provenance: Provenance::Mock,
        }
    }
}

/// Kline intervals accepted by the exchange.
pub const SUPPORTED_INTERVALS: [&str; 16] = [
    "1s", "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w",
    "1M",
];

pub fn is_supported_interval(interval: &str) -> bool {
    SUPPORTED_INTERVALS.contains(&interval)
}

/// Bar length for an interval code such as `15m`, `1h` or `1d`. `M` is a
/// 30-day month. Counts that do not fit a duration give `None`.
pub fn interval_duration(interval: &str) -> Option<Duration> {
    let interval = interval.trim();
    let split = interval.find(|c: char| !c.is_ascii_digit())?;
    let (count, unit) = interval.split_at(split);
    let count: i64 = count.parse().ok().filter(|n| *n > 0)?;
    match unit {
        "s" => Duration::try_seconds(count),
        "m" => Duration::try_minutes(count),
        "h" => Duration::try_hours(count),
        "d" => Duration::try_days(count),
        "w" => Duration::try_weeks(count),
        "M" => Duration::try_days(count.checked_mul(30)?),
        _ => None,
    }
}
