//! Inference Engine - Classifier Adapter
//!
//! Bọc một classifier đã train sẵn, expose `predict_proba` cho pipeline.
//! Model được giữ dưới dạng snapshot `Arc` - swap model không chặn
//! các inference đang chạy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ndarray::{Array2, ArrayView2};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::constants::MALICIOUS_CLASS_INDEX;
use crate::error::{DetectorError, DetectorResult};
use crate::logic::features::{FeatureMatrix, FEATURE_COUNT};

/// Class probabilities, one row per sample
pub type PredictionMatrix = Array2<f64>;

/// Allowed drift of a probability row sum from 1.0 (f32 model outputs)
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-5;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub kind: String,            // "random_forest" or "onnx"
    pub n_classes: usize,
    pub features: usize,
    /// SHA-256 of the supplied model bytes
    pub checksum: Option<String>,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Engine status for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_name: String,
    pub inference_device: String,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
    pub rows_scored: u64,
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Probabilistic classifier capability (tree ensemble, ONNX, stubs)
///
/// Implementations must be read-only at inference time: the same model
/// state and input always produce the same output.
pub trait ProbabilisticClassifier: Send + Sync {
    fn name(&self) -> &str;

    fn is_fitted(&self) -> bool;

    /// Batch class probabilities; `features` has FEATURE_COUNT columns
    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> DetectorResult<PredictionMatrix>;

    fn metadata(&self) -> Option<ModelMetadata> {
        None
    }
}

// ============================================================================
// ADAPTER
// ============================================================================

/// Owns the current model snapshot and inference counters
pub struct ClassifierAdapter {
    model: RwLock<Option<Arc<dyn ProbabilisticClassifier>>>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
    rows_scored: AtomicU64,
}

impl ClassifierAdapter {
    /// Adapter with no model; inference fails until one is installed
    pub fn new() -> Self {
        Self {
            model: RwLock::new(None),
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
            rows_scored: AtomicU64::new(0),
        }
    }

    pub fn with_model(model: Arc<dyn ProbabilisticClassifier>) -> Self {
        let adapter = Self::new();
        adapter.install(model);
        adapter
    }

    /// Install a new model snapshot, returning the previous one.
    ///
    /// In-flight inferences keep the snapshot they started with.
    pub fn install(&self, model: Arc<dyn ProbabilisticClassifier>) -> Option<Arc<dyn ProbabilisticClassifier>> {
        log::info!("Installing classifier '{}' (fitted: {})", model.name(), model.is_fitted());
        self.model.write().replace(model)
    }

    pub fn unload(&self) {
        if let Some(old) = self.model.write().take() {
            log::info!("Classifier '{}' unloaded", old.name());
        }
    }

    /// Current model snapshot
    pub fn snapshot(&self) -> Option<Arc<dyn ProbabilisticClassifier>> {
        self.model.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().map(|m| m.is_fitted()).unwrap_or(false)
    }

    /// One prediction row per feature row, order preserved
    pub fn predict_proba(&self, features: &FeatureMatrix) -> DetectorResult<PredictionMatrix> {
        let model = self.snapshot().ok_or(DetectorError::ModelNotReady)?;
        if !model.is_fitted() {
            return Err(DetectorError::ModelNotReady);
        }

        if features.ncols() != FEATURE_COUNT {
            return Err(DetectorError::dimension(FEATURE_COUNT, features.ncols(), "feature matrix width"));
        }

        let rows = features.nrows();
        if rows == 0 {
            return Ok(Array2::zeros((0, MALICIOUS_CLASS_INDEX + 1)));
        }

        let start_time = std::time::Instant::now();
        let predictions = model.predict_proba(features.view())?;

        if predictions.nrows() != rows {
            return Err(DetectorError::dimension(rows, predictions.nrows(), "prediction rows"));
        }
        if predictions.ncols() <= MALICIOUS_CLASS_INDEX {
            return Err(DetectorError::dimension(MALICIOUS_CLASS_INDEX + 1, predictions.ncols(), "class columns"));
        }
        check_probabilities(&predictions)?;

        let elapsed = start_time.elapsed().as_micros() as u64;
        self.latency_sum_us.fetch_add(elapsed, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
        self.rows_scored.fetch_add(rows as u64, Ordering::Relaxed);
        log::debug!("'{}' scored {} rows in {}us", model.name(), rows, elapsed);

        Ok(predictions)
    }

    pub fn status(&self) -> EngineStatus {
        let snapshot = self.snapshot();
        let (loaded, name, device) = match snapshot.as_ref() {
            Some(model) if model.is_fitted() => {
                let device = match model.metadata().map(|m| m.kind) {
                    Some(kind) if kind == "onnx" => "ONNX Runtime (CPU)",
                    _ => "native (CPU)",
                };
                (true, model.name().to_string(), device)
            }
            Some(model) => (false, model.name().to_string(), "none"),
            None => (false, "None".to_string(), "none"),
        };

        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_loaded: loaded,
            model_name: name,
            inference_device: device.to_string(),
            avg_latency_ms: avg,
            inference_count: count,
            rows_scored: self.rows_scored.load(Ordering::Relaxed),
        }
    }
}

/// Every value in [0, 1] and every row summing to 1
fn check_probabilities(predictions: &PredictionMatrix) -> DetectorResult<()> {
    for (row, probs) in predictions.outer_iter().enumerate() {
        if let Some(bad) = probs.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(DetectorError::Inference(format!(
                "row {}: probability {} outside [0, 1]", row, bad
            )));
        }

        let sum = probs.sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(DetectorError::Inference(format!(
                "row {}: probabilities sum to {}", row, sum
            )));
        }
    }
    Ok(())
}

impl Default for ClassifierAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierAdapter")
            .field("model", &self.snapshot().map(|m| m.name().to_string()))
            .field("inference_count", &self.inference_count.load(Ordering::Relaxed))
            .finish()
    }
}
