//! Read-only sequence model inference.
//!
//! Parameters are loaded once at startup, validated against the feature
//! schema, and then shared by reference across concurrent requests.

pub mod lstm;
pub mod params;
pub mod runner;

pub use params::{DenseParameters, LayerParameters, ModelParameters, ScalerParameters};
pub use runner::{SequenceModel, CLASS_ORDER, NUM_CLASSES, NUM_LAYERS};
