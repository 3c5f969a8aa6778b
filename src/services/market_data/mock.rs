//! Deterministic synthetic candles used when no live source is available.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use super::{interval_duration, CandleFeed, MarketDataProvider, Provenance};
use crate::models::credentials::MarketDataCredentials;
use crate::models::indicators::Candle;
use crate::models::market::CoinSummary;

/// Close time of the last generated bar.
fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Same symbol and length always yield the same series.
#[derive(Debug, Clone, Default)]
pub struct MockMarketDataProvider;

impl MockMarketDataProvider {
    pub fn new() -> Self {
        Self
    }

    /// Unknown intervals, or series that would run past the representable
    /// time range, fall back to hourly bars.
    pub fn generate(&self, symbol: &str, interval: &str, limit: usize) -> Vec<Candle> {
        let hourly = Duration::hours(1);
        let (step, start) = interval_duration(interval)
            .and_then(|step| Some((step, series_start(step, limit)?)))
            .or_else(|| Some((hourly, series_start(hourly, limit)?)))
            .unwrap_or((hourly, anchor()));
        let seed = symbol_seed(symbol);
        let base = 50.0 + (seed % 950) as f64;
        let phase = (seed % 17) as f64 / 17.0 * std::f64::consts::TAU;

        let mut candles = Vec::with_capacity(limit);
        let mut prev_close = base;
        for i in 0..limit {
            let t = i as f64;
            let trend = base * (1.0 + 0.0008 * t);
            let wave = base * 0.015 * (t * 0.25 + phase).sin();
            let close = trend + wave;
            let open = prev_close;
            let high = open.max(close) * 1.003;
            let low = open.min(close) * 0.997;
            let volume = 1_000.0 + 250.0 * ((t * 0.7 + phase).cos() + 1.0);

            candles.push(Candle::new(
                open,
                high,
                low,
                close,
                volume,
                open_time(start, step, i),
            ));
            prev_close = close;
        }
        candles
    }

    /// Fixed snapshot of large pairs, highest quote volume first.
    pub fn sample_top_coins(&self, limit: usize) -> Vec<CoinSummary> {
        let mut coins = vec![
            CoinSummary::new("BTCUSDT", 43_250.50, 2.45, 25_000.0, 1_081_263_750.0),
            CoinSummary::new("SOLUSDT", 98.30, 5.20, 8_500_000.0, 835_550_000.0),
            CoinSummary::new("BNBUSDT", 315.40, -0.75, 2_000_000.0, 630_800_000.0),
            CoinSummary::new("XRPUSDT", 0.62, 3.10, 950_000_000.0, 589_000_000.0),
            CoinSummary::new("ETHUSDT", 2_280.75, 1.85, 150_000.0, 342_112_500.0),
        ];
        coins.truncate(limit);
        coins
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketDataProvider {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
        _credentials: Option<&MarketDataCredentials>,
    ) -> CandleFeed {
        CandleFeed {
            symbol: symbol.to_string(),
            candles: self.generate(symbol, interval, limit),
            provenance: Provenance::Mock,
        }
    }
}

fn series_start(step: Duration, limit: usize) -> Option<DateTime<Utc>> {
    let span = step.checked_mul(i32::try_from(limit).ok()?)?;
    anchor().checked_sub_signed(span)
}

fn open_time(start: DateTime<Utc>, step: Duration, index: usize) -> DateTime<Utc> {
    i32::try_from(index)
        .ok()
        .and_then(|i| step.checked_mul(i))
        .and_then(|offset| start.checked_add_signed(offset))
        .unwrap_or(start)
}

/// FNV-1a over the symbol bytes.
fn symbol_seed(symbol: &str) -> u64 {
    symbol.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}
