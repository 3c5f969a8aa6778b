//! MACD (Moving Average Convergence Divergence) indicator

use crate::common::math;
use crate::models::indicators::{Candle, MacdIndicator};

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Calculate MACD indicator
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal) of MACD
/// Histogram = MACD - Signal
///
/// Needs `slow + signal - 1` closes so the signal line has its seed.
pub fn macd_from_closes(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Option<MacdIndicator> {
    if fast_period == 0 || fast_period >= slow_period || signal_period == 0 {
        return None;
    }
    if closes.len() < slow_period + signal_period - 1 {
        return None;
    }

    let fast = math::ema_series(closes, fast_period)?;
    let slow = math::ema_series(closes, slow_period)?;

    // Align both series on the close index where the slow EMA starts.
    let offset = slow_period - fast_period;
    let macd_line: Vec<f64> = slow
        .iter()
        .enumerate()
        .map(|(i, slow_value)| fast[i + offset] - slow_value)
        .collect();

    let macd = *macd_line.last()?;
    let signal = math::ema(&macd_line, signal_period)?;

    Some(MacdIndicator {
        macd,
        signal,
        histogram: macd - signal,
    })
}

pub fn calculate_macd(
    candles: &[Candle],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Option<MacdIndicator> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    macd_from_closes(&closes, fast_period, slow_period, signal_period)
}

/// Calculate MACD with default periods (12, 26, 9)
pub fn calculate_macd_default(candles: &[Candle]) -> Option<MacdIndicator> {
    calculate_macd(candles, MACD_FAST, MACD_SLOW, MACD_SIGNAL)
}
