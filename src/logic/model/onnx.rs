//! ONNX Classifier - ONNX Runtime Integration
//!
//! Load model classifier đã export sang ONNX (vd. skl2onnx với
//! `zipmap=False`) và đọc output `probabilities` dạng tensor (n × k).

use std::path::Path;

use ndarray::{Array2, ArrayView2};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::error::{DetectorError, DetectorResult};
use crate::logic::features::FEATURE_COUNT;
use super::inference::{ModelMetadata, PredictionMatrix, ProbabilisticClassifier};

/// Preferred output name for class probabilities
const PROBABILITIES_OUTPUT: &str = "probabilities";

/// ONNX-backed classifier; the session is run under a mutex because
/// `Session::run` needs exclusive access
pub struct OnnxClassifier {
    session: Mutex<Session>,
    output_name: String,
    metadata: ModelMetadata,
}

impl OnnxClassifier {
    /// Load ONNX model từ file
    pub fn load_file(model_path: impl AsRef<Path>) -> DetectorResult<Self> {
        let model_path = model_path.as_ref();
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(DetectorError::ModelLoad(format!("Model not found: {}", model_path.display())));
        }

        let bytes = std::fs::read(model_path)?;
        Self::from_bytes(&bytes, &model_path.display().to_string())
    }

    /// Load ONNX model từ bytes
    pub fn from_bytes(model_bytes: &[u8], name: &str) -> DetectorResult<Self> {
        log::info!("Loading ONNX model from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| DetectorError::ModelLoad(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| DetectorError::ModelLoad(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| DetectorError::ModelLoad(format!("Load from memory error: {}", e)))?;

        let output_name = session.outputs.iter()
            .find(|o| o.name == PROBABILITIES_OUTPUT)
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .ok_or_else(|| DetectorError::ModelLoad("No output defined".to_string()))?;

        log::info!("ONNX model loaded, reading output '{}'", output_name);

        let metadata = ModelMetadata {
            name: name.to_string(),
            kind: "onnx".to_string(),
            // Known only after the first run
            n_classes: 0,
            features: FEATURE_COUNT,
            checksum: Some(hex::encode(Sha256::digest(model_bytes))),
            loaded_at: chrono::Utc::now(),
        };

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            metadata,
        })
    }
}

/// Reshape a flat row-major probability buffer into (rows × k)
fn probabilities_from_flat(rows: usize, data: &[f32]) -> DetectorResult<PredictionMatrix> {
    if rows == 0 || data.len() % rows != 0 {
        return Err(DetectorError::Inference(format!(
            "{} probability values for {} rows", data.len(), rows
        )));
    }

    let n_classes = data.len() / rows;
    Array2::from_shape_vec((rows, n_classes), data.iter().map(|&p| p as f64).collect())
        .map_err(|e| DetectorError::Inference(format!("Array error: {}", e)))
}

impl ProbabilisticClassifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.metadata.name
    }

    fn is_fitted(&self) -> bool {
        true
    }

    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> DetectorResult<PredictionMatrix> {
        let rows = features.nrows();
        if features.ncols() != FEATURE_COUNT {
            return Err(DetectorError::dimension(FEATURE_COUNT, features.ncols(), "feature matrix width"));
        }

        let input_array: Array2<f32> = features.mapv(|v| v as f32);
        let input_tensor = Value::from_array(input_array)
            .map_err(|e| DetectorError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| DetectorError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs.get(self.output_name.as_str())
            .ok_or_else(|| DetectorError::Inference(format!("No output '{}'", self.output_name)))?;

        let (_, data) = output.try_extract_tensor::<f32>()
            .map_err(|e| DetectorError::Inference(format!("Extract error: {}", e)))?;

        probabilities_from_flat(rows, data)
    }

    fn metadata(&self) -> Option<ModelMetadata> {
        Some(self.metadata.clone())
    }
}
