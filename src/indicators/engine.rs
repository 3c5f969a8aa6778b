//! Indicator engine: RSI, MACD and the EMA family at the latest candle.

use crate::error::AnalysisError;
use crate::indicators::momentum::{calculate_macd_default, calculate_rsi_default};
use crate::indicators::momentum::{
    MACD_SIGNAL, MACD_SLOW, RSI_OVERBOUGHT, RSI_OVERSOLD, RSI_PERIOD,
};
use crate::indicators::trend::{calculate_ema, calculate_ema_family, EMA_PERIODS};
use crate::models::indicators::{Candle, IndicatorSet};
use crate::models::signal::SignalDirection;

/// Fast and slow EMA of the trend cross read by [`IndicatorEngine::rule_signal`].
pub const TREND_CROSS_PERIODS: (usize, usize) = (20, 50);

/// Longest lookback among the configured windows (EMA 50).
pub const MIN_CANDLES: usize = max_window();

const fn max_window() -> usize {
    let macd = MACD_SLOW + MACD_SIGNAL - 1;
    let rsi = RSI_PERIOD + 1;
    let ema = EMA_PERIODS[2];
    let mut max = macd;
    if rsi > max {
        max = rsi;
    }
    if ema > max {
        max = ema;
    }
    max
}

pub struct IndicatorEngine;

impl IndicatorEngine {
    /// Reject sequences that are out of order, duplicated or non-finite.
    pub fn validate(candles: &[Candle]) -> Result<(), AnalysisError> {
        if let Some((i, _)) = candles.iter().enumerate().find(|(_, c)| !c.is_finite()) {
            return Err(AnalysisError::MalformedCandles(format!(
                "candle {} contains a non-finite value",
                i
            )));
        }
        if let Some(i) = candles
            .windows(2)
            .position(|pair| pair[1].open_time <= pair[0].open_time)
        {
            return Err(AnalysisError::MalformedCandles(format!(
                "open_time must be strictly increasing (violated at index {})",
                i + 1
            )));
        }
        Ok(())
    }

    /// Compute the indicator set for the latest point.
    pub fn compute(candles: &[Candle]) -> Result<IndicatorSet, AnalysisError> {
        let insufficient = || AnalysisError::InsufficientData {
            required: MIN_CANDLES,
            available: candles.len(),
        };
        if candles.len() < MIN_CANDLES {
            return Err(insufficient());
        }

        let rsi = calculate_rsi_default(candles).ok_or_else(insufficient)?;
        let macd = calculate_macd_default(candles).ok_or_else(insufficient)?;
        let ema = calculate_ema_family(candles).ok_or_else(insufficient)?;

        Ok(IndicatorSet { rsi, macd, ema })
    }

    /// Indicator-only read: oversold RSI with EMA20 above EMA50 and a positive
    /// MACD histogram is LONG, the mirror is SHORT, anything else HOLD.
    ///
    /// Reported next to the fused result; the fusion policy never sees it.
    pub fn rule_signal(candles: &[Candle], indicators: &IndicatorSet) -> SignalDirection {
        let (fast, slow) = TREND_CROSS_PERIODS;
        let (Some(ema_fast), Some(ema_slow)) =
            (calculate_ema(candles, fast), calculate_ema(candles, slow))
        else {
            return SignalDirection::Hold;
        };

        let uptrend = ema_fast > ema_slow;
        let rsi = indicators.rsi;
        let histogram = indicators.macd.histogram;

        if rsi < RSI_OVERSOLD && uptrend && histogram > 0.0 {
            SignalDirection::Long
        } else if rsi > RSI_OVERBOUGHT && !uptrend && histogram < 0.0 {
            SignalDirection::Short
        } else {
            SignalDirection::Hold
        }
    }
}
