//! Breaker block (supply/demand flip) detection

use crate::models::indicators::Candle;
use crate::models::structure::{BreakerBlock, BreakerKind};

/// Single forward pass over consecutive candle pairs.
///
/// A bullish breaker fires when the current low clears the previous high; a
/// bearish breaker when the current high sits below the previous low. Both
/// cannot fire for the same pair since `high >= low` on every candle.
pub fn detect_breaker_blocks(candles: &[Candle]) -> Vec<BreakerBlock> {
    candles
        .windows(2)
        .filter_map(|pair| {
            let (prev, current) = (&pair[0], &pair[1]);
            if current.low > prev.high {
                Some(BreakerBlock {
                    kind: BreakerKind::Bullish,
                    level: prev.high,
                    timestamp: current.open_time,
                })
            } else if current.high < prev.low {
                Some(BreakerBlock {
                    kind: BreakerKind::Bearish,
                    level: prev.low,
                    timestamp: current.open_time,
                })
            } else {
                None
            }
        })
        .collect()
}
