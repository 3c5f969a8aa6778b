//! Fixed-order feature vector shared with the sequence model.
//!
//! The component order is a versioned schema. Reordering or adding a
//! component requires bumping [`FEATURE_SCHEMA_VERSION`] and retraining.

use crate::error::AnalysisError;
use crate::indicators::IndicatorEngine;
use crate::models::indicators::{Candle, IndicatorSet};
use serde::Serialize;

pub const FEATURE_SCHEMA_VERSION: u32 = 1;
pub const FEATURE_COUNT: usize = 10;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "rsi_normalized",
    "macd",
    "macd_signal",
    "macd_histogram",
    "ema_9",
    "ema_21",
    "ema_50",
    "close",
    "volume",
    "range",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Name of the first non-finite component, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        self.values
            .iter()
            .position(|v| !v.is_finite())
            .map(|i| FEATURE_NAMES[i])
    }
}

pub struct FeatureAssembler;

impl FeatureAssembler {
    /// Map indicators and the current candle into schema order.
    ///
    /// RSI is scaled to [0, 1]; everything else stays in native units.
    pub fn assemble(indicators: &IndicatorSet, current: &Candle) -> FeatureVector {
        FeatureVector::from_array([
            indicators.rsi / 100.0,
            indicators.macd.macd,
            indicators.macd.signal,
            indicators.macd.histogram,
            indicators.ema.ema_9,
            indicators.ema.ema_21,
            indicators.ema.ema_50,
            current.close,
            current.volume,
            current.range(),
        ])
    }

    /// Run the indicator engine and assemble in one step.
    pub fn from_candles(candles: &[Candle]) -> Result<FeatureVector, AnalysisError> {
        let indicators = IndicatorEngine::compute(candles)
            .map_err(|e| AnalysisError::FeatureAssembly(e.to_string()))?;
        let current = candles
            .last()
            .ok_or_else(|| AnalysisError::FeatureAssembly("no candles".to_string()))?;
        Ok(Self::assemble(&indicators, current))
    }
}
