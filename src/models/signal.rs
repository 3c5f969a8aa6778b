use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    Hold,
    Long,
    Short,
}

impl SignalDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalDirection::Hold => "HOLD",
            SignalDirection::Long => "LONG",
            SignalDirection::Short => "SHORT",
        }
    }

    pub fn is_directional(&self) -> bool {
        !matches!(self, SignalDirection::Hold)
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HOLD" => Ok(SignalDirection::Hold),
            "LONG" => Ok(SignalDirection::Long),
            "SHORT" => Ok(SignalDirection::Short),
            other => Err(format!("unknown signal '{}'", other)),
        }
    }
}

/// Output of the sequence model. `confidence` is the winning class probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelSignal {
    pub signal: SignalDirection,
    pub confidence: f64,
}

/// Opinion of the advisory path, live or fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryDecision {
    pub signal: SignalDirection,
    pub reason: String,
}
