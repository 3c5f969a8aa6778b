//! Error taxonomy for the analysis pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Per-request failures that surface to the caller.
///
/// Every variant still produces a well-formed HOLD response at the HTTP
/// boundary; only the status code and diagnostic differ.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    #[error("invalid symbol '{0}'")]
    InvalidSymbol(String),

    #[error("insufficient data: need at least {required} candles, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("malformed candles: {0}")]
    MalformedCandles(String),

    #[error("feature assembly failed: {0}")]
    FeatureAssembly(String),

    #[error("model inference failed: {0}")]
    ModelInference(String),
}

impl AnalysisError {
    /// Stable machine-readable identifier used in responses and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidSymbol(_) => "invalid_symbol",
            AnalysisError::InsufficientData { .. } => "insufficient_data",
            AnalysisError::MalformedCandles(_) => "malformed_candles",
            AnalysisError::FeatureAssembly(_) => "feature_assembly",
            AnalysisError::ModelInference(_) => "model_inference",
        }
    }
}

/// Degenerate trade math. Absorbed by the engine, never a request failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeometryError {
    #[error("invalid trade geometry: {0}")]
    InvalidTradeGeometry(String),
}

/// Failures of the external reasoning service. Recovered by the fallback rules.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("rate limited by advisory service")]
    RateLimited,

    #[error("advisory service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed advisory response: {0}")]
    Malformed(String),
}

impl AdvisoryError {
    /// Whether a second attempt can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AdvisoryError::Transport(_) | AdvisoryError::Timeout(_) | AdvisoryError::RateLimited => {
                true
            }
            AdvisoryError::Status { status, .. } => *status >= 500,
            AdvisoryError::Malformed(_) => false,
        }
    }
}

impl From<reqwest::Error> for AdvisoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AdvisoryError::Malformed(err.to_string())
        } else {
            AdvisoryError::Transport(err.to_string())
        }
    }
}

/// Failures of the exchange data source. Recovered by the mock generator.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("exchange returned status {0}")]
    Status(u16),

    #[error("failed to decode kline row: {0}")]
    Decode(String),
}

/// Fatal problems found while booting. The service refuses to start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read model parameters at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model parameters: {0}")]
    ModelLoad(#[from] serde_json::Error),

    #[error("model parameter shape mismatch: {0}")]
    ModelShape(String),

    #[error("feature schema mismatch: model expects v{expected}, engine provides v{actual}")]
    SchemaMismatch { expected: u32, actual: u32 },

    #[error("invalid configuration: {0}")]
    Config(String),
}
