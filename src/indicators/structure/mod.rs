//! Market structure: support/resistance and breaker blocks

pub mod breaker_blocks;
pub mod support_resistance;

pub use breaker_blocks::*;
pub use support_resistance::*;

use crate::models::indicators::Candle;
use crate::models::structure::{BreakerBlock, StructureLevels};

/// Stateless structure analysis over a candle window.
pub struct StructureDetector;

impl StructureDetector {
    /// Levels over the most recent `window` candles.
    pub fn levels(candles: &[Candle], window: usize) -> Option<StructureLevels> {
        calculate_support_resistance(candles, window)
    }

    /// Breaker blocks over the full slice, keeping only the newest `limit`.
    pub fn breaker_blocks(candles: &[Candle], limit: usize) -> Vec<BreakerBlock> {
        let mut blocks = detect_breaker_blocks(candles);
        if blocks.len() > limit {
            blocks.drain(..blocks.len() - limit);
        }
        blocks
    }
}
