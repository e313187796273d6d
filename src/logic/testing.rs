//! Test support: deterministic stub classifiers and forest fixtures

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use ndarray::{Array2, ArrayView2};

use crate::constants::{DEFAULT_N_ESTIMATORS, MALICIOUS_CLASS_INDEX};
use crate::error::{DetectorError, DetectorResult};
use crate::logic::features::{layout_hash, FEATURE_VERSION};
use crate::logic::model::forest::{DecisionTree, ForestConfig, ForestDocument};
use crate::logic::model::inference::{PredictionMatrix, ProbabilisticClassifier};

/// Returns `[1 - p, p]` with `p = malicious[row % len]`
#[derive(Debug)]
pub struct FixedClassifier {
    malicious: Vec<f64>,
    columns: usize,
    calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(malicious: Vec<f64>) -> Self {
        Self { malicious, columns: 2, calls: AtomicUsize::new(0) }
    }

    /// Broken model that only reports one class column
    pub fn single_column(malicious: Vec<f64>) -> Self {
        Self { malicious, columns: 1, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProbabilisticClassifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    fn is_fitted(&self) -> bool {
        true
    }

    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> DetectorResult<PredictionMatrix> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut out = Array2::zeros((features.nrows(), self.columns));
        for row in 0..features.nrows() {
            let p = self.malicious[row % self.malicious.len()];
            if self.columns > MALICIOUS_CLASS_INDEX {
                out[[row, 0]] = 1.0 - p;
                out[[row, MALICIOUS_CLASS_INDEX]] = p;
            } else {
                out[[row, 0]] = p;
            }
        }
        Ok(out)
    }
}

/// Returns the same prediction table for any input of matching row count
#[derive(Debug)]
pub struct TableClassifier {
    table: PredictionMatrix,
}

impl TableClassifier {
    pub fn new(table: PredictionMatrix) -> Self {
        Self { table }
    }
}

impl ProbabilisticClassifier for TableClassifier {
    fn name(&self) -> &str {
        "table"
    }

    fn is_fitted(&self) -> bool {
        true
    }

    fn predict_proba(&self, _features: ArrayView2<'_, f64>) -> DetectorResult<PredictionMatrix> {
        Ok(self.table.clone())
    }
}

/// Blocks inside `predict_proba` until another task acknowledges it.
///
/// Gives up after `GATE_TIMEOUT`; `was_acknowledged` reports which happened.
#[derive(Debug, Default)]
pub struct GatedClassifier {
    started: AtomicBool,
    acknowledged: AtomicBool,
    saw_ack: AtomicBool,
}

const GATE_TIMEOUT: Duration = Duration::from_secs(2);

impl GatedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn acknowledge(&self) {
        self.acknowledged.store(true, Ordering::SeqCst);
    }

    pub fn was_acknowledged(&self) -> bool {
        self.saw_ack.load(Ordering::SeqCst)
    }
}

impl ProbabilisticClassifier for GatedClassifier {
    fn name(&self) -> &str {
        "gated"
    }

    fn is_fitted(&self) -> bool {
        true
    }

    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> DetectorResult<PredictionMatrix> {
        self.started.store(true, Ordering::SeqCst);

        let deadline = Instant::now() + GATE_TIMEOUT;
        while !self.acknowledged.load(Ordering::SeqCst) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        self.saw_ack.store(self.acknowledged.load(Ordering::SeqCst), Ordering::SeqCst);

        Ok(Array2::from_elem((features.nrows(), 2), 0.5))
    }
}

/// Model the training collaborator never fitted
#[derive(Debug)]
pub struct UnfittedClassifier;

impl ProbabilisticClassifier for UnfittedClassifier {
    fn name(&self) -> &str {
        "unfitted"
    }

    fn is_fitted(&self) -> bool {
        false
    }

    fn predict_proba(&self, _features: ArrayView2<'_, f64>) -> DetectorResult<PredictionMatrix> {
        Err(DetectorError::ModelNotReady)
    }
}

/// Stump on `size`: `<= 1000` → 0.1 malicious, `> 1000` → 0.95 malicious
pub fn size_stump() -> DecisionTree {
    DecisionTree {
        children_left: vec![1, -1, -1],
        children_right: vec![2, -1, -1],
        feature: vec![0, -2, -2],
        threshold: vec![1000.0, -2.0, -2.0],
        value: vec![vec![10.0, 10.0], vec![9.0, 1.0], vec![1.0, 19.0]],
    }
}

/// Forest document of `DEFAULT_N_ESTIMATORS` size stumps
pub fn stump_document() -> ForestDocument {
    ForestDocument {
        feature_version: FEATURE_VERSION,
        layout_hash: layout_hash(),
        n_classes: 2,
        config: ForestConfig::default(),
        trees: (0..DEFAULT_N_ESTIMATORS).map(|_| size_stump()).collect(),
    }
}
