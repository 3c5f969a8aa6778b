//! RSI (Relative Strength Index) indicator

use crate::models::indicators::Candle;

pub const RSI_PERIOD: usize = 14;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Calculate RSI with Wilder smoothing
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss
///
/// The first averages are simple means over `period` deltas; every later
/// delta is folded in as `(prev * (period - 1) + current) / period`.
pub fn rsi_from_closes(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let mut deltas = closes.windows(2).map(|w| w[1] - w[0]);

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for change in deltas.by_ref().take(period) {
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    let smoothing = (period - 1) as f64;
    for change in deltas {
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * smoothing + gain) / period as f64;
        avg_loss = (avg_loss * smoothing + loss) / period as f64;
    }

    Some(rsi_from_averages(avg_gain, avg_loss))
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // flat series has no momentum either way
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}

/// Calculate RSI over candle closes
pub fn calculate_rsi(candles: &[Candle], period: usize) -> Option<f64> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    rsi_from_closes(&closes, period)
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(candles: &[Candle]) -> Option<f64> {
    calculate_rsi(candles, RSI_PERIOD)
}
