//! Random Forest - pre-fitted tree ensemble
//!
//! Không train ở đây. Cây được training collaborator xuất ra dạng bảng node
//! phẳng (children_left / children_right / feature / threshold / value) và
//! nạp vào qua `install` hoặc file JSON.
//!
//! A sample goes left when `x[feature] <= threshold`. Class probabilities
//! are the per-tree normalized leaf weights averaged over all trees.

use std::path::Path;

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{
    DEFAULT_MAX_DEPTH, DEFAULT_N_ESTIMATORS, DEFAULT_RANDOM_STATE, MALICIOUS_CLASS_INDEX,
};
use crate::error::{DetectorError, DetectorResult};
use crate::logic::features::{check_model_layout, FEATURE_COUNT};
use super::inference::{ModelMetadata, PredictionMatrix, ProbabilisticClassifier};

/// Marker for "no child" in the node table
const LEAF: i64 = -1;

// ============================================================================
// CONFIG
// ============================================================================

/// Hyperparameters the ensemble was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    /// Seed used by the trainer, kept for reproducibility audits
    pub random_state: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_depth: DEFAULT_MAX_DEPTH,
            random_state: DEFAULT_RANDOM_STATE,
        }
    }
}

// ============================================================================
// DECISION TREE
// ============================================================================

/// Flat node table of one fitted tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights (counts or fractions)
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == LEAF
    }

    /// Check the node table and return the tree depth.
    ///
    /// Children must have a larger index than their parent, which keeps
    /// traversal acyclic. A node reachable from several parents takes the
    /// depth of its longest path.
    pub fn validate(&self, n_classes: usize) -> DetectorResult<usize> {
        let n = self.node_count();
        if n == 0 {
            return Err(DetectorError::ModelLoad("tree has no nodes".to_string()));
        }
        let lengths = [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(DetectorError::ModelLoad(format!(
                "node table lengths differ: {} nodes, columns {:?}", n, lengths
            )));
        }

        let mut depth = vec![0usize; n];
        let mut max_depth = 0;

        for node in 0..n {
            let weights = &self.value[node];
            if weights.len() != n_classes {
                return Err(DetectorError::dimension(n_classes, weights.len(), format!("node {} class weights", node)));
            }

            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(DetectorError::ModelLoad(format!("node {} has a single child", node)));
                }
                let valid = weights.iter().all(|w| w.is_finite() && *w >= 0.0);
                if !valid || weights.iter().sum::<f64>() <= 0.0 {
                    return Err(DetectorError::ModelLoad(format!("leaf {} has no usable class weight", node)));
                }
                continue;
            }

            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(DetectorError::ModelLoad(format!("node {} child {} out of order", node, child)));
                }
            }

            let feature = self.feature[node];
            if feature < 0 || feature as usize >= FEATURE_COUNT {
                return Err(DetectorError::dimension(
                    FEATURE_COUNT,
                    feature.unsigned_abs() as usize,
                    format!("node {} feature index bound", node),
                ));
            }
            if !self.threshold[node].is_finite() {
                return Err(DetectorError::ModelLoad(format!("node {} threshold is not finite", node)));
            }

            let child_depth = depth[node] + 1;
            for child in [left as usize, right as usize] {
                depth[child] = depth[child].max(child_depth);
            }
            max_depth = max_depth.max(child_depth);
        }

        Ok(max_depth)
    }

    /// Leaf reached by `sample`; the tree must be validated
    fn leaf_for(&self, sample: &ArrayView1<'_, f64>) -> usize {
        let mut node = 0;
        while !self.is_leaf(node) {
            let feature = self.feature[node] as usize;
            node = if sample[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }
}

// ============================================================================
// FOREST DOCUMENT (model supply format)
// ============================================================================

/// Serialized fitted forest as produced by the training side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestDocument {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub n_classes: usize,
    pub config: ForestConfig,
    pub trees: Vec<DecisionTree>,
}

// ============================================================================
// RANDOM FOREST
// ============================================================================

#[derive(Debug, Clone)]
struct FittedForest {
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

/// Tree ensemble with fixed hyperparameters; unfitted until `install`
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    fitted: Option<FittedForest>,
    metadata: Option<ModelMetadata>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            fitted: None,
            metadata: None,
        }
    }

    /// Install fitted trees after validating them against the config
    pub fn install(&mut self, document: ForestDocument) -> DetectorResult<()> {
        self.install_with_checksum(document, None)
    }

    fn install_with_checksum(&mut self, document: ForestDocument, checksum: Option<String>) -> DetectorResult<()> {
        check_model_layout(document.feature_version, document.layout_hash)?;

        if document.config != self.config {
            return Err(DetectorError::ModelLoad(format!(
                "forest built with {:?}, expected {:?}", document.config, self.config
            )));
        }
        if document.n_classes <= MALICIOUS_CLASS_INDEX {
            return Err(DetectorError::dimension(MALICIOUS_CLASS_INDEX + 1, document.n_classes, "class count"));
        }
        if document.trees.len() != self.config.n_estimators {
            return Err(DetectorError::ModelLoad(format!(
                "expected {} trees, got {}", self.config.n_estimators, document.trees.len()
            )));
        }

        for (i, tree) in document.trees.iter().enumerate() {
            let depth = tree.validate(document.n_classes)?;
            if depth > self.config.max_depth {
                return Err(DetectorError::ModelLoad(format!(
                    "tree {} depth {} exceeds max_depth {}", i, depth, self.config.max_depth
                )));
            }
        }

        log::info!(
            "Random forest installed: {} trees, {} classes, max_depth {}",
            document.trees.len(), document.n_classes, self.config.max_depth
        );

        self.metadata = Some(ModelMetadata {
            name: "random_forest".to_string(),
            kind: "random_forest".to_string(),
            n_classes: document.n_classes,
            features: FEATURE_COUNT,
            checksum,
            loaded_at: chrono::Utc::now(),
        });
        self.fitted = Some(FittedForest {
            n_classes: document.n_classes,
            trees: document.trees,
        });

        Ok(())
    }

    /// Parse and install a JSON forest document
    pub fn from_json_bytes(config: ForestConfig, bytes: &[u8]) -> DetectorResult<Self> {
        let document: ForestDocument = serde_json::from_slice(bytes)?;
        let checksum = hex::encode(Sha256::digest(bytes));

        let mut forest = Self::new(config);
        forest.install_with_checksum(document, Some(checksum))?;
        Ok(forest)
    }

    pub fn load_json_file(config: ForestConfig, path: impl AsRef<Path>) -> DetectorResult<Self> {
        let path = path.as_ref();
        log::info!("Loading forest model from: {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::from_json_bytes(config, &bytes)
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl ProbabilisticClassifier for RandomForest {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> DetectorResult<PredictionMatrix> {
        let fitted = self.fitted.as_ref().ok_or(DetectorError::ModelNotReady)?;
        if features.ncols() != FEATURE_COUNT {
            return Err(DetectorError::dimension(FEATURE_COUNT, features.ncols(), "feature matrix width"));
        }

        let mut proba = Array2::<f64>::zeros((features.nrows(), fitted.n_classes));

        for (row, sample) in features.outer_iter().enumerate() {
            for tree in &fitted.trees {
                let weights = &tree.value[tree.leaf_for(&sample)];
                let total: f64 = weights.iter().sum();
                for (class, weight) in weights.iter().enumerate() {
                    proba[[row, class]] += weight / total;
                }
            }
        }

        let n_trees = fitted.trees.len() as f64;
        proba.mapv_inplace(|p| p / n_trees);
        Ok(proba)
    }

    fn metadata(&self) -> Option<ModelMetadata> {
        self.metadata.clone()
    }
}
