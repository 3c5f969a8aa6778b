//! Support and Resistance levels detection

use crate::models::indicators::Candle;
use crate::models::structure::StructureLevels;

/// Default lookback, in candles.
pub const SUPPORT_RESISTANCE_WINDOW: usize = 20;

/// Indices of the lowest low and highest high in `candles`.
///
/// Ties resolve to the most recent candle.
pub fn find_extremes(candles: &[Candle]) -> Option<(usize, usize)> {
    let first = candles.first()?;
    let (mut low_idx, mut low) = (0, first.low);
    let (mut high_idx, mut high) = (0, first.high);

    for (i, candle) in candles.iter().enumerate().skip(1) {
        if candle.low <= low {
            low = candle.low;
            low_idx = i;
        }
        if candle.high >= high {
            high = candle.high;
            high_idx = i;
        }
    }

    Some((low_idx, high_idx))
}

/// Calculate support and resistance levels
///
/// Support is the minimum low and resistance the maximum high over the last
/// `window` candles (or all of them when fewer are available).
pub fn calculate_support_resistance(candles: &[Candle], window: usize) -> Option<StructureLevels> {
    if window == 0 {
        return None;
    }
    let start = candles.len().saturating_sub(window);
    let recent = &candles[start..];
    let (low_idx, high_idx) = find_extremes(recent)?;

    Some(StructureLevels {
        support: recent[low_idx].low,
        resistance: recent[high_idx].high,
    })
}
