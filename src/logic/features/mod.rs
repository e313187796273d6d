//! Features Module - Feature Extraction Engine
//!
//! Chuyển packet metadata thành feature matrix cố định cho classifier.

pub mod layout;
pub mod vector;
pub mod encoder;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, LayoutInfo, check_model_layout, layout_hash};
pub use vector::FeatureVector;
pub use encoder::{FeatureEncoder, FeatureMatrix};
