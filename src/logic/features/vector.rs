//! One encoded packet

use serde_json::{Map, Value};

use super::layout::{feature_index, FEATURE_COUNT, FEATURE_LAYOUT};

/// Packet features in `FEATURE_LAYOUT` order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.0[i])
    }

    /// `{"size": .., "protocol": .., ...}` for trace logs
    pub fn to_log_entry(&self) -> Value {
        let named: Map<String, Value> = FEATURE_LAYOUT
            .iter()
            .zip(self.0)
            .map(|(name, value)| (name.to_string(), Value::from(value)))
            .collect();
        Value::Object(named)
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }
}
