//! Alert Generator
//!
//! CHỈ chứa logic threshold - ghép prediction i với packet i.
//! Input: PredictionMatrix + TrafficBatch
//! Output: Vec<AlertRecord> theo đúng thứ tự packet

use crate::constants::{MALICIOUS_CLASS_INDEX, MALICIOUS_THRESHOLD};
use crate::error::{DetectorError, DetectorResult};
use crate::logic::model::PredictionMatrix;
use crate::logic::traffic::{PacketRecord, TrafficBatch};
use super::types::AlertRecord;

#[derive(Debug, Clone, Copy, Default)]
pub struct AlertGenerator;

impl AlertGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Emit an alert for every packet whose malicious probability is
    /// strictly above `MALICIOUS_THRESHOLD`
    pub fn generate(&self, predictions: &PredictionMatrix, batch: &TrafficBatch) -> DetectorResult<Vec<AlertRecord>> {
        if predictions.nrows() != batch.len() {
            return Err(DetectorError::dimension(batch.len(), predictions.nrows(), "prediction rows"));
        }
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        if predictions.ncols() <= MALICIOUS_CLASS_INDEX {
            return Err(DetectorError::dimension(MALICIOUS_CLASS_INDEX + 1, predictions.ncols(), "class columns"));
        }

        let mut alerts = Vec::new();

        for (index, (row, packet)) in predictions.outer_iter().zip(batch.packets.iter()).enumerate() {
            let p = row[MALICIOUS_CLASS_INDEX];
            if p > MALICIOUS_THRESHOLD {
                let alert = build_alert(index, p, packet)?;
                log::warn!(
                    "Network anomaly: {} -> {} (protocol {}, confidence {:.3})",
                    alert.source, alert.destination, alert.protocol, p
                );
                alerts.push(alert);
            }
        }

        Ok(alerts)
    }
}

fn build_alert(index: usize, confidence: f64, packet: &PacketRecord) -> DetectorResult<AlertRecord> {
    let field = |name: &str| {
        packet
            .get(name)
            .cloned()
            .ok_or_else(|| DetectorError::schema(index, name, "is missing"))
    };

    Ok(AlertRecord::network_anomaly(
        confidence,
        field("source")?,
        field("destination")?,
        field("protocol")?,
    ))
}
