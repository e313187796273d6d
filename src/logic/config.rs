//! Configuration module
//!
//! Cấu hình cho host binary: model nằm ở đâu, định dạng gì.
//! Threshold KHÔNG nằm ở đây - xem `constants::MALICIOUS_THRESHOLD`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::model::forest::ForestConfig;

/// Supplied model format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// JSON forest document
    Forest,
    /// ONNX graph exported from the trainer
    Onnx,
}

impl ModelFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "forest" | "json" => Some(ModelFormat::Forest),
            "onnx" => Some(ModelFormat::Onnx),
            _ => None,
        }
    }

    /// Guess from file extension, defaulting to the forest format
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("onnx") => ModelFormat::Onnx,
            _ => ModelFormat::Forest,
        }
    }
}

/// Detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub model_path: PathBuf,
    pub model_format: ModelFormat,
    pub forest: ForestConfig,
}

impl DetectorConfig {
    /// Config for a model file, format inferred from its extension
    pub fn for_model(path: impl Into<PathBuf>) -> Self {
        let model_path = path.into();
        Self {
            model_format: ModelFormat::from_path(&model_path),
            model_path,
            forest: ForestConfig::default(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::for_model(constants::get_model_path());

        if let Some(format) = constants::get_model_format() {
            match ModelFormat::parse(&format) {
                Some(parsed) => config.model_format = parsed,
                None => log::warn!("Unknown model format '{}', using {:?}", format, config.model_format),
            }
        }

        config
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::for_model(constants::DEFAULT_MODEL_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ModelFormat::from_path(Path::new("models/rf.onnx")), ModelFormat::Onnx);
        assert_eq!(ModelFormat::from_path(Path::new("models/rf.ONNX")), ModelFormat::Onnx);
        assert_eq!(ModelFormat::from_path(Path::new("models/rf.json")), ModelFormat::Forest);
        assert_eq!(ModelFormat::from_path(Path::new("models/rf")), ModelFormat::Forest);
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(ModelFormat::parse("onnx"), Some(ModelFormat::Onnx));
        assert_eq!(ModelFormat::parse("forest"), Some(ModelFormat::Forest));
        assert_eq!(ModelFormat::parse("xgboost"), None);
    }

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.model_path, PathBuf::from(constants::DEFAULT_MODEL_PATH));
        assert_eq!(config.model_format, ModelFormat::Forest);
        assert_eq!(config.forest, ForestConfig::default());
    }
}
