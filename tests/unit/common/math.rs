//! Unit tests for moving-average primitives

use fusetrade::common::math::{ema, ema_alpha, ema_from_previous, ema_series, sma};

#[test]
fn test_sma_uses_first_period_values() {
    let values = [1.0, 2.0, 3.0, 100.0];
    assert_eq!(sma(&values, 3), Some(2.0));
    assert_eq!(sma(&values, 5), None);
    assert_eq!(sma(&values, 0), None);
}

#[test]
fn test_ema_alpha() {
    assert!((ema_alpha(9) - 0.2).abs() < 1e-12);
    assert!((ema_from_previous(20.0, 10.0, 9) - 12.0).abs() < 1e-12);
}

#[test]
fn test_ema_series_is_seeded_with_sma() {
    let values = [2.0, 4.0, 6.0, 8.0, 10.0];
    let series = ema_series(&values, 3).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series[0], 4.0);
    // alpha = 0.5
    assert!((series[1] - 6.0).abs() < 1e-12);
    assert!((series[2] - 8.0).abs() < 1e-12);
}

#[test]
fn test_ema_of_linear_series_lags_by_half_window() {
    let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
    let latest = ema(&values, 9).unwrap();
    assert!((latest - (99.0 - 4.0)).abs() < 1e-9);
}
