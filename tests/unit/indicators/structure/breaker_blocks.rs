//! Unit tests for breaker block detection

use fusetrade::indicators::structure::detect_breaker_blocks;
use fusetrade::indicators::StructureDetector;
use fusetrade::models::structure::BreakerKind;

use crate::support::{candle_at, rising_candles};

#[test]
fn test_gap_up_emits_bullish_breaker() {
    let candles = vec![
        candle_at(0, 10.0, 11.0, 9.5, 10.8),
        candle_at(1, 11.5, 12.5, 11.2, 12.0),
    ];
    let blocks = detect_breaker_blocks(&candles);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind, BreakerKind::Bullish);
    assert_eq!(blocks[0].level, 11.0);
    assert_eq!(blocks[0].timestamp, candles[1].open_time);
}

#[test]
fn test_gap_down_emits_bearish_breaker() {
    let candles = vec![
        candle_at(0, 10.0, 11.0, 9.5, 9.8),
        candle_at(1, 9.0, 9.2, 8.5, 8.7),
    ];
    let blocks = detect_breaker_blocks(&candles);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind, BreakerKind::Bearish);
    assert_eq!(blocks[0].level, 9.5);
    assert_eq!(blocks[0].timestamp, candles[1].open_time);
}

#[test]
fn test_overlapping_candles_emit_nothing() {
    let candles = rising_candles(50, 100.0, 0.5);
    assert!(detect_breaker_blocks(&candles).is_empty());
    assert!(detect_breaker_blocks(&candles[..1]).is_empty());
}

#[test]
fn test_touching_levels_are_not_breakers() {
    let candles = vec![
        candle_at(0, 10.0, 11.0, 9.5, 10.8),
        candle_at(1, 11.0, 12.0, 11.0, 11.5),
    ];
    assert!(detect_breaker_blocks(&candles).is_empty());
}

#[test]
fn test_detector_keeps_newest_blocks() {
    // staircase of gaps: every pair is a bullish breaker
    let candles: Vec<_> = (0..10)
        .map(|i| {
            let base = 10.0 + i as f64 * 2.0;
            candle_at(i, base, base + 1.0, base, base + 0.5)
        })
        .collect();
    assert_eq!(detect_breaker_blocks(&candles).len(), 9);

    let kept = StructureDetector::breaker_blocks(&candles, 5);
    assert_eq!(kept.len(), 5);
    assert_eq!(kept[0].timestamp, candles[5].open_time);
    assert_eq!(kept[4].timestamp, candles[9].open_time);
}
