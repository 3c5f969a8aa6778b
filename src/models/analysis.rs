use serde::{Deserialize, Serialize};

use super::indicators::IndicatorSet;
use super::signal::{AdvisoryDecision, ModelSignal, SignalDirection};
use super::structure::{BreakerBlock, StructureLevels};
use super::trade::TradeSetup;

/// Trust signal for the caller: `live` only when both the market data and the
/// advisory opinion came from real services with user credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Live,
    Simulated,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Live => "live",
            Mode::Simulated => "simulated",
        }
    }
}

/// Non-fatal reason attached to a result whose trade plan was withheld.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub current_price: f64,
    pub indicators: IndicatorSet,
    pub support_resistance: StructureLevels,
    pub breaker_blocks: Vec<BreakerBlock>,
    pub lstm_signal: ModelSignal,
    /// Indicator-only read, reported for context. Not part of fusion.
    pub indicator_signal: SignalDirection,
    pub ai_decision: AdvisoryDecision,
    pub final_signal: SignalDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_setup: Option<TradeSetup>,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}
