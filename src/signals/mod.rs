//! Signal reconciliation and trade planning.

pub mod engine;
pub mod fusion;
pub mod planner;

pub use engine::{AnalysisEngine, AnalysisRequest};
pub use fusion::{FusionOutcome, FusionPolicy, FusionRule};
pub use planner::TradePlanner;
