//! Feature Encoder
//!
//! TrafficBatch → feature matrix (n × FEATURE_COUNT).
//! Row i luôn tương ứng với packet i - không lọc, không sắp xếp lại.

use ndarray::{Array2, ArrayView1};
use serde_json::Value;

use crate::error::{DetectorError, DetectorResult};
use crate::logic::traffic::{PacketRecord, TrafficBatch};
use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT};
use super::vector::FeatureVector;

/// Batch feature matrix, one row per packet
pub type FeatureMatrix = Array2<f64>;

/// Stateless packet encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode every packet of the batch, preserving order
    pub fn encode(&self, batch: &TrafficBatch) -> DetectorResult<FeatureMatrix> {
        let mut matrix = FeatureMatrix::zeros((batch.len(), FEATURE_COUNT));

        for (index, (packet, mut row)) in batch.packets.iter().zip(matrix.rows_mut()).enumerate() {
            let vector = self.encode_packet(index, packet)?;
            log::trace!("packet {}: {}", index, vector.to_log_entry());
            row.assign(&ArrayView1::from(vector.as_slice()));
        }

        Ok(matrix)
    }

    /// Encode one packet; `index` only labels errors
    pub fn encode_packet(&self, index: usize, packet: &PacketRecord) -> DetectorResult<FeatureVector> {
        let mut values = [0.0f64; FEATURE_COUNT];

        for (slot, field) in FEATURE_LAYOUT.iter().enumerate() {
            let raw = packet
                .get(field)
                .ok_or_else(|| DetectorError::schema(index, field, "is missing"))?;
            values[slot] = coerce_number(raw)
                .ok_or_else(|| DetectorError::schema(index, field, format!("is not numeric: {}", raw)))?;
        }

        Ok(FeatureVector::from(values))
    }
}

/// Numbers, booleans and numeric strings; everything else is rejected
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }?;

    number.is_finite().then_some(number)
}
