//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::models::indicators::{Candle, EmaFamily};

pub const EMA_PERIODS: [usize; 3] = [9, 21, 50];

/// Calculate EMA for a specific period, seeded with the SMA of the first
/// `period` closes
pub fn calculate_ema(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    math::ema(&closes, period)
}

/// Calculate the 9/21/50 family used by the feature vector
pub fn calculate_ema_family(candles: &[Candle]) -> Option<EmaFamily> {
    let [fast, mid, slow] = EMA_PERIODS;
    Some(EmaFamily {
        ema_9: calculate_ema(candles, fast)?,
        ema_21: calculate_ema(candles, mid)?,
        ema_50: calculate_ema(candles, slow)?,
    })
}
