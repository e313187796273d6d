//! Logic Module - Detection pipeline & engines
//!
//! - `traffic` - Input types (PacketRecord, TrafficBatch)
//! - `features/` - Feature encoding (layout, vector, encoder)
//! - `model/` - Classifier inference (adapter, forest, ONNX)
//! - `alerts/` - Threshold → AlertRecord
//! - `analyzer/` - Pipeline orchestrator

pub mod config;
pub mod traffic;
pub mod features;
pub mod model;
pub mod alerts;
pub mod analyzer;

#[cfg(test)]
pub(crate) mod testing;
