//! Shared data models spanning the engine layers.

pub mod analysis;
pub mod credentials;
pub mod indicators;
pub mod market;
pub mod signal;
pub mod structure;
pub mod symbol;
pub mod trade;

pub use analysis::{AnalysisResult, Diagnostic, Mode};
pub use credentials::{AdvisoryCredentials, Credentials, MarketDataCredentials};
pub use indicators::{Candle, EmaFamily, IndicatorSet, MacdIndicator};
pub use market::CoinSummary;
pub use signal::{AdvisoryDecision, ModelSignal, SignalDirection};
pub use structure::{BreakerBlock, BreakerKind, StructureLevels};
pub use symbol::normalize_symbol;
pub use trade::TradeSetup;
