//! NetShield Core - network traffic anomaly detection
//!
//! Packet metadata → feature matrix → ensemble class probabilities →
//! `NETWORK_ANOMALY` alerts for detections above the confidence threshold.

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{DetectorError, DetectorResult, ErrorKind};
pub use logic::alerts::AlertRecord;
pub use logic::analyzer::TrafficAnalyzer;
pub use logic::config::{DetectorConfig, ModelFormat};
pub use logic::model::{ClassifierAdapter, ProbabilisticClassifier};
pub use logic::traffic::{PacketRecord, TrafficBatch};
