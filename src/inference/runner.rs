//! Sequence model runner: stacked LSTM, dense head, softmax.

use ndarray::{Array1, Array2};
use std::path::Path;

use super::lstm::{matrix, vector, LstmLayer};
use super::params::{ModelParameters, ScalerParameters};
use crate::error::{AnalysisError, StartupError};
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_SCHEMA_VERSION};
use crate::models::signal::{ModelSignal, SignalDirection};

pub const NUM_LAYERS: usize = 2;
pub const NUM_CLASSES: usize = 3;

/// Output index to direction, fixed at training time.
pub const CLASS_ORDER: [SignalDirection; NUM_CLASSES] = [
    SignalDirection::Hold,
    SignalDirection::Long,
    SignalDirection::Short,
];

#[derive(Debug, Clone)]
struct FeatureScaler {
    min: Array1<f64>,
    span: Array1<f64>,
}

impl FeatureScaler {
    fn from_parameters(params: &ScalerParameters) -> Result<Self, StartupError> {
        let min = vector("scaler.min", &params.min, FEATURE_COUNT)?;
        let max = vector("scaler.max", &params.max, FEATURE_COUNT)?;
        let span = &max - &min;
        if span.iter().any(|s| *s < 0.0) {
            return Err(StartupError::ModelShape(
                "scaler.max must not be below scaler.min".to_string(),
            ));
        }
        Ok(Self { min, span })
    }

    fn transform(&self, x: &Array1<f64>) -> Array1<f64> {
        let mut out = x - &self.min;
        out.zip_mut_with(&self.span, |v, span| {
            // constant features collapse to zero
            *v = if *span > 0.0 { *v / *span } else { 0.0 };
        });
        out
    }
}

/// Loaded, validated classifier. Immutable after construction.
#[derive(Debug, Clone)]
pub struct SequenceModel {
    model_version: String,
    sequence_length: usize,
    layers: Vec<LstmLayer>,
    output_weight: Array2<f64>,
    output_bias: Array1<f64>,
    scaler: Option<FeatureScaler>,
}

impl SequenceModel {
    pub fn from_path(path: &Path) -> Result<Self, StartupError> {
        Self::from_parameters(ModelParameters::from_path(path)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, StartupError> {
        Self::from_parameters(ModelParameters::from_json_str(raw)?)
    }

    pub fn from_parameters(params: ModelParameters) -> Result<Self, StartupError> {
        if params.feature_schema_version != FEATURE_SCHEMA_VERSION {
            return Err(StartupError::SchemaMismatch {
                expected: params.feature_schema_version,
                actual: FEATURE_SCHEMA_VERSION,
            });
        }
        if params.input_size != FEATURE_COUNT {
            return Err(StartupError::ModelShape(format!(
                "input_size is {}, feature vector has {} components",
                params.input_size, FEATURE_COUNT
            )));
        }
        if params.hidden_size == 0 {
            return Err(StartupError::ModelShape("hidden_size must be > 0".to_string()));
        }
        if params.sequence_length == 0 {
            return Err(StartupError::ModelShape(
                "sequence_length must be > 0".to_string(),
            ));
        }
        if params.layers.len() != NUM_LAYERS {
            return Err(StartupError::ModelShape(format!(
                "expected {} LSTM layers, found {}",
                NUM_LAYERS,
                params.layers.len()
            )));
        }

        let hidden = params.hidden_size;
        let layers = params
            .layers
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let input = if i == 0 { params.input_size } else { hidden };
                LstmLayer::from_parameters(&format!("layers[{}]", i), layer, input, hidden)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output_weight = matrix("output.weight", &params.output.weight, NUM_CLASSES, hidden)?;
        let output_bias = vector("output.bias", &params.output.bias, NUM_CLASSES)?;
        let scaler = params
            .scaler
            .as_ref()
            .map(FeatureScaler::from_parameters)
            .transpose()?;

        Ok(Self {
            model_version: params.model_version,
            sequence_length: params.sequence_length,
            layers,
            output_weight,
            output_bias,
            scaler,
        })
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    /// Class probabilities in [`CLASS_ORDER`].
    ///
    /// The feature vector is repeated `sequence_length` times to form the
    /// input sequence; only the final hidden state of the top layer feeds the
    /// dense head.
    pub fn probabilities(&self, features: &FeatureVector) -> Result<[f64; NUM_CLASSES], AnalysisError> {
        if let Some(name) = features.first_non_finite() {
            return Err(AnalysisError::ModelInference(format!(
                "feature '{}' is not finite",
                name
            )));
        }

        let raw = Array1::from(features.as_array().to_vec());
        let x = match &self.scaler {
            Some(scaler) => scaler.transform(&raw),
            None => raw,
        };

        let mut states: Vec<(Array1<f64>, Array1<f64>)> =
            self.layers.iter().map(LstmLayer::init_state).collect();

        for _ in 0..self.sequence_length {
            let mut input = x.clone();
            for (layer, state) in self.layers.iter().zip(states.iter_mut()) {
                let (h, c) = layer.step(&input, &state.0, &state.1);
                input = h.clone();
                *state = (h, c);
            }
        }

        let top = states
            .last()
            .map(|(h, _)| h)
            .ok_or_else(|| AnalysisError::ModelInference("model has no layers".to_string()))?;
        let logits = self.output_weight.dot(top) + &self.output_bias;
        let probs = softmax(&logits);

        if probs.iter().any(|p| !p.is_finite()) {
            return Err(AnalysisError::ModelInference(
                "non-finite class probabilities".to_string(),
            ));
        }

        let mut out = [0.0; NUM_CLASSES];
        for (slot, p) in out.iter_mut().zip(probs.iter()) {
            *slot = *p;
        }
        Ok(out)
    }

    /// Most probable direction and its probability. Ties go to the lower
    /// class index, so HOLD wins any tie it is part of.
    pub fn predict(&self, features: &FeatureVector) -> Result<ModelSignal, AnalysisError> {
        let probs = self.probabilities(features)?;
        let mut best = 0;
        for (i, p) in probs.iter().enumerate().skip(1) {
            if *p > probs[best] {
                best = i;
            }
        }
        Ok(ModelSignal {
            signal: CLASS_ORDER[best],
            confidence: probs[best],
        })
    }
}

fn softmax(logits: &Array1<f64>) -> Array1<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}
