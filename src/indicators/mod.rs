//! Indicator engine and structure detector.

pub mod engine;
pub mod momentum;
pub mod structure;
pub mod trend;

pub use engine::{IndicatorEngine, MIN_CANDLES};
pub use structure::StructureDetector;
