//! Unit tests for the sequence model runner

use fusetrade::error::{AnalysisError, StartupError};
use fusetrade::features::{FeatureVector, FEATURE_COUNT};
use fusetrade::inference::{ModelParameters, SequenceModel};
use fusetrade::models::signal::SignalDirection;
use std::path::Path;

use crate::support::{tiny_model, tiny_model_json, CONFIDENT_LONG};

fn features() -> FeatureVector {
    FeatureVector::from_array([0.55, 0.3, 0.2, 0.1, 101.0, 100.0, 99.0, 101.5, 1_200.0, 2.0])
}

#[test]
fn test_predict_returns_argmax_and_its_probability() {
    let model = tiny_model(CONFIDENT_LONG);
    let signal = model.predict(&features()).unwrap();
    assert_eq!(signal.signal, SignalDirection::Long);

    let e3 = 3.0_f64.exp();
    assert!((signal.confidence - e3 / (e3 + 2.0)).abs() < 1e-12);
}

#[test]
fn test_probabilities_sum_to_one() {
    let model = tiny_model([0.5, -1.0, 2.0]);
    let probs = model.probabilities(&features()).unwrap();
    assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    assert_eq!(model.predict(&features()).unwrap().signal, SignalDirection::Short);
}

#[test]
fn test_ties_resolve_to_hold() {
    let model = tiny_model([0.0, 0.0, 0.0]);
    let signal = model.predict(&features()).unwrap();
    assert_eq!(signal.signal, SignalDirection::Hold);
    assert!((signal.confidence - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_prediction_is_deterministic() {
    let raw = std::fs::read_to_string(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("models/sequence_model.json"),
    )
    .unwrap();
    let model = SequenceModel::from_json_str(&raw).unwrap();
    let first = model.predict(&features()).unwrap();
    let second = model.predict(&features()).unwrap();
    assert_eq!(first, second);
    assert!((0.0..=1.0).contains(&first.confidence));
}

#[test]
fn test_bundled_model_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/sequence_model.json");
    let model = SequenceModel::from_path(&path).unwrap();
    assert_eq!(model.sequence_length(), 60);
    assert!(!model.model_version().is_empty());
}

#[test]
fn test_non_finite_input_fails_the_request() {
    let model = tiny_model(CONFIDENT_LONG);
    let mut values = *features().as_array();
    values[0] = f64::NAN;
    let result = model.predict(&FeatureVector::from_array(values));
    assert!(matches!(result, Err(AnalysisError::ModelInference(_))));
}

#[test]
fn test_schema_version_mismatch_is_fatal() {
    let mut params = ModelParameters::from_json_str(&tiny_model_json(CONFIDENT_LONG)).unwrap();
    params.feature_schema_version = 2;
    assert!(matches!(
        SequenceModel::from_parameters(params),
        Err(StartupError::SchemaMismatch { expected: 2, actual: 1 })
    ));
}

#[test]
fn test_wrong_layer_count_is_fatal() {
    let mut params = ModelParameters::from_json_str(&tiny_model_json(CONFIDENT_LONG)).unwrap();
    params.layers.pop();
    assert!(matches!(
        SequenceModel::from_parameters(params),
        Err(StartupError::ModelShape(_))
    ));
}

#[test]
fn test_wrong_weight_shape_is_fatal() {
    let mut params = ModelParameters::from_json_str(&tiny_model_json(CONFIDENT_LONG)).unwrap();
    params.layers[0].weight_ih[3].push(0.0);
    let err = SequenceModel::from_parameters(params).unwrap_err();
    assert!(err.to_string().contains("layers[0].weight_ih"), "{}", err);

    let mut params = ModelParameters::from_json_str(&tiny_model_json(CONFIDENT_LONG)).unwrap();
    params.output.bias.push(0.0);
    assert!(matches!(
        SequenceModel::from_parameters(params),
        Err(StartupError::ModelShape(_))
    ));
}

#[test]
fn test_corrupt_or_missing_file_is_fatal() {
    assert!(matches!(
        SequenceModel::from_json_str("{ not json"),
        Err(StartupError::ModelLoad(_))
    ));
    assert!(matches!(
        SequenceModel::from_path(Path::new("/nonexistent/model.json")),
        Err(StartupError::Io { .. })
    ));
}

#[test]
fn test_scaler_shape_is_validated() {
    let mut params = ModelParameters::from_json_str(&tiny_model_json(CONFIDENT_LONG)).unwrap();
    params.scaler = Some(fusetrade::inference::ScalerParameters {
        min: vec![0.0; FEATURE_COUNT],
        max: vec![1.0; FEATURE_COUNT - 1],
    });
    assert!(matches!(
        SequenceModel::from_parameters(params),
        Err(StartupError::ModelShape(_))
    ));
}

#[test]
fn test_scaled_model_still_predicts() {
    let mut params = ModelParameters::from_json_str(&tiny_model_json(CONFIDENT_LONG)).unwrap();
    params.scaler = Some(fusetrade::inference::ScalerParameters {
        min: vec![0.0; FEATURE_COUNT],
        // zero span on every component
        max: vec![0.0; FEATURE_COUNT],
    });
    let model = SequenceModel::from_parameters(params).unwrap();
    assert_eq!(model.predict(&features()).unwrap().signal, SignalDirection::Long);
}
