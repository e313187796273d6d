//! Model Module - Classifier inference
//!
//! Tách logic inference khỏi pipeline.
//! Dễ dàng swap model: tree ensemble, ONNX, hoặc stub khi test.

pub mod inference;
pub mod forest;
pub mod onnx;

use std::sync::Arc;

use crate::error::DetectorResult;
use crate::logic::config::{DetectorConfig, ModelFormat};

// Re-export common types
pub use inference::{
    ClassifierAdapter, EngineStatus, ModelMetadata, PredictionMatrix, ProbabilisticClassifier,
};
pub use forest::{DecisionTree, ForestConfig, ForestDocument, RandomForest};
pub use onnx::OnnxClassifier;

/// Load the configured model as a shareable snapshot
pub fn load_classifier(config: &DetectorConfig) -> DetectorResult<Arc<dyn ProbabilisticClassifier>> {
    let model: Arc<dyn ProbabilisticClassifier> = match config.model_format {
        ModelFormat::Forest => Arc::new(RandomForest::load_json_file(config.forest, &config.model_path)?),
        ModelFormat::Onnx => Arc::new(OnnxClassifier::load_file(&config.model_path)?),
    };
    Ok(model)
}
