//! On-disk parameter format for the recurrent classifier.
//!
//! Weights follow the PyTorch `nn.LSTM` layout: each of `weight_ih`,
//! `weight_hh`, `bias_ih`, `bias_hh` stacks the input, forget, cell and output
//! gates (in that order) along the first axis.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::StartupError;

fn default_sequence_length() -> usize {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParameters {
    pub model_version: String,
    pub feature_schema_version: u32,
    pub input_size: usize,
    pub hidden_size: usize,
    #[serde(default = "default_sequence_length")]
    pub sequence_length: usize,
    pub layers: Vec<LayerParameters>,
    pub output: DenseParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<ScalerParameters>,
}

/// One LSTM layer, shapes `[4H, in]`, `[4H, H]`, `[4H]`, `[4H]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerParameters {
    pub weight_ih: Vec<Vec<f64>>,
    pub weight_hh: Vec<Vec<f64>>,
    pub bias_ih: Vec<f64>,
    pub bias_hh: Vec<f64>,
}

/// Final linear layer, shapes `[classes, H]` and `[classes]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseParameters {
    pub weight: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

/// Min-max scaling fitted during training, one entry per feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParameters {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl ModelParameters {
    pub fn from_json_str(raw: &str) -> Result<Self, StartupError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, StartupError> {
        let raw = std::fs::read_to_string(path).map_err(|source| StartupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}
