//! Central Configuration Constants
//!
//! Single source of truth for detection constants and env defaults.
//! Threshold và class index là hằng số cố định - không đọc từ env.

/// Malicious-class probability must be strictly greater than this to alert
pub const MALICIOUS_THRESHOLD: f64 = 0.8;

/// Column of the prediction vector holding the malicious-class probability
pub const MALICIOUS_CLASS_INDEX: usize = 1;

/// Alert type tag emitted for every detection
pub const ALERT_TYPE: &str = "NETWORK_ANOMALY";

/// Ensemble hyperparameters the supplied forest was built with
pub const DEFAULT_N_ESTIMATORS: usize = 100;
pub const DEFAULT_MAX_DEPTH: usize = 10;
pub const DEFAULT_RANDOM_STATE: u64 = 42;

/// Default model file when no environment variable is set
pub const DEFAULT_MODEL_PATH: &str = "models/network_forest.json";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "NetShield";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("NETSHIELD_MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get explicit model format ("forest" | "onnx") if set
pub fn get_model_format() -> Option<String> {
    std::env::var("NETSHIELD_MODEL_FORMAT")
        .ok()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}
