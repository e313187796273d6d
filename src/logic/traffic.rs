//! Traffic Types
//!
//! Input từ capture collaborator: batch các packet dạng mapping.
//! KHÔNG validate ở đây - Feature Encoder quyết định schema.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// PACKET RECORD
// ============================================================================

/// One observed packet, kept as the raw mapping it arrived in.
///
/// Fields may be absent or mistyped until the batch is encoded; the
/// encoder and alert generator report those as schema errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PacketRecord {
    fields: Map<String, Value>,
}

impl PacketRecord {
    /// Build a well-formed packet
    pub fn new(
        size: u64,
        protocol: impl Into<Value>,
        port: u16,
        frequency: f64,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert("size".to_string(), Value::from(size));
        fields.insert("protocol".to_string(), protocol.into());
        fields.insert("port".to_string(), Value::from(port));
        fields.insert("frequency".to_string(), Value::from(frequency));
        fields.insert("source".to_string(), Value::String(source.into()));
        fields.insert("destination".to_string(), Value::String(destination.into()));
        Self { fields }
    }

    /// Wrap an arbitrary mapping as received
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn protocol(&self) -> Option<&Value> {
        self.get("protocol")
    }

    pub fn source(&self) -> Option<&Value> {
        self.get("source")
    }

    pub fn destination(&self) -> Option<&Value> {
        self.get("destination")
    }
}

// ============================================================================
// TRAFFIC BATCH
// ============================================================================

/// Ordered packets plus any batch-level metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficBatch {
    pub packets: Vec<PacketRecord>,
    /// Every other top-level key of the batch object
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl TrafficBatch {
    pub fn new(packets: Vec<PacketRecord>) -> Self {
        Self {
            packets,
            metadata: Map::new(),
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_packet_new_has_all_fields() {
        let packet = PacketRecord::new(1500, 6, 443, 0.1, "10.0.0.1", "10.0.0.2");
        assert_eq!(packet.get("size"), Some(&json!(1500)));
        assert_eq!(packet.protocol(), Some(&json!(6)));
        assert_eq!(packet.source(), Some(&json!("10.0.0.1")));
        assert_eq!(packet.destination(), Some(&json!("10.0.0.2")));
    }

    #[test]
    fn test_batch_parses_packets_and_metadata() {
        let batch = TrafficBatch::from_json_str(
            r#"{
                "capture_id": "eth0-17",
                "packets": [
                    {"size": 64, "protocol": 1, "port": 0, "frequency": 5.0,
                     "source": "10.0.0.3", "destination": "10.0.0.4"},
                    {"size": 1500}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.metadata.get("capture_id"), Some(&json!("eth0-17")));
        assert!(batch.packets[1].get("protocol").is_none());
    }

    #[test]
    fn test_batch_without_packets_key_is_rejected() {
        assert!(TrafficBatch::from_json_str(r#"{"capture_id": "x"}"#).is_err());
    }

    #[test]
    fn test_packet_serializes_as_plain_mapping() {
        let packet = PacketRecord::new(64, 1, 0, 5.0, "a", "b");
        let value = serde_json::to_value(&packet).unwrap();
        assert_eq!(value["port"], json!(0));
        assert_eq!(value["frequency"], json!(5.0));
    }
}
