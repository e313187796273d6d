//! Alert Types
//!
//! Output contract cho alert consumer. KHÔNG chứa logic.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::ALERT_TYPE;

/// One high-confidence detection, correlated to its source packet.
///
/// Serializes to exactly `type, confidence, source, destination, protocol`.
/// `source`, `destination` and `protocol` are copied verbatim from the packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(rename = "type")]
    pub alert_type: String,
    pub confidence: f64,
    pub source: Value,
    pub destination: Value,
    pub protocol: Value,
}

impl AlertRecord {
    pub fn network_anomaly(confidence: f64, source: Value, destination: Value, protocol: Value) -> Self {
        Self {
            alert_type: ALERT_TYPE.to_string(),
            confidence,
            source,
            destination,
            protocol,
        }
    }
}
