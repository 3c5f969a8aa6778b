//! Precedence policy between the model and the advisory opinion.

use crate::models::signal::{AdvisoryDecision, ModelSignal, SignalDirection};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.80;

/// Which rule produced the final signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionRule {
    /// Both opinions name the same direction (or both HOLD).
    Agreement,
    /// Disagreement won by a model confidence strictly above the threshold.
    ModelOverride,
    /// The advisory asked to stand aside.
    AdvisoryHold,
    /// Disagreement with no rule that applies cleanly.
    Unresolved,
}

impl FusionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            FusionRule::Agreement => "agreement",
            FusionRule::ModelOverride => "model_override",
            FusionRule::AdvisoryHold => "advisory_hold",
            FusionRule::Unresolved => "unresolved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusionOutcome {
    pub signal: SignalDirection,
    pub rule: FusionRule,
}

/// A directional signal is only emitted when both opinions agree or the model
/// is highly confident. Every other disagreement resolves to HOLD, including a
/// confidence exactly at the threshold.
#[derive(Debug, Clone, Copy)]
pub struct FusionPolicy {
    threshold: f64,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl FusionPolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn fuse(&self, model: &ModelSignal, advisory: &AdvisoryDecision) -> FusionOutcome {
        if model.signal == advisory.signal {
            return FusionOutcome {
                signal: model.signal,
                rule: FusionRule::Agreement,
            };
        }

        if model.signal.is_directional() && model.confidence > self.threshold {
            return FusionOutcome {
                signal: model.signal,
                rule: FusionRule::ModelOverride,
            };
        }

        let rule = if advisory.signal == SignalDirection::Hold {
            FusionRule::AdvisoryHold
        } else {
            FusionRule::Unresolved
        };
        FusionOutcome {
            signal: SignalDirection::Hold,
            rule,
        }
    }
}
