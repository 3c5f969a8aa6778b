use serde::{Deserialize, Serialize};

/// 24h ticker snapshot for one pair, as shown in the top-coins list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSummary {
    pub symbol: String,
    pub price: f64,
    pub change_24h: f64,
    pub volume: f64,
    pub quote_volume: f64,
}

impl CoinSummary {
    pub fn new(symbol: &str, price: f64, change_24h: f64, volume: f64, quote_volume: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            price,
            change_24h,
            volume,
            quote_volume,
        }
    }
}
