use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureLevels {
    pub support: f64,
    pub resistance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakerKind {
    Bullish,
    Bearish,
}

/// A gap through the previous candle's range.
///
/// `level` is the breached previous high (bullish) or previous low (bearish);
/// `timestamp` is the open time of the candle that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakerBlock {
    #[serde(rename = "type")]
    pub kind: BreakerKind,
    pub level: f64,
    pub timestamp: DateTime<Utc>,
}
