//! Integration Tests for Feature Extraction
//!
//! Encoder + layout + vector hoạt động cùng nhau trên batch JSON thật.

#[cfg(test)]
mod integration_tests {
    use crate::logic::features::{
        layout::{feature_index, FEATURE_COUNT},
        encoder::FeatureEncoder,
    };
    use crate::logic::traffic::TrafficBatch;

    const CAPTURE: &str = r#"{
        "sensor": "edge-01",
        "packets": [
            {"size": 1500, "protocol": 6, "port": 443, "frequency": 0.1,
             "source": "10.0.0.1", "destination": "10.0.0.2"},
            {"size": 64, "protocol": 1, "port": 0, "frequency": 5.0,
             "source": "10.0.0.3", "destination": "10.0.0.4"},
            {"size": 512, "protocol": 17, "port": 53, "frequency": 12.5,
             "source": "10.0.0.5", "destination": "8.8.8.8"}
        ]
    }"#;

    /// Matrix columns follow the layout names
    #[test]
    fn test_columns_follow_layout() {
        let batch = TrafficBatch::from_json_str(CAPTURE).unwrap();
        let matrix = FeatureEncoder::new().encode(&batch).unwrap();

        assert_eq!(matrix.ncols(), FEATURE_COUNT);
        let port = feature_index("port").unwrap();
        let protocol = feature_index("protocol").unwrap();
        assert_eq!(matrix.column(port).to_vec(), vec![443.0, 0.0, 53.0]);
        assert_eq!(matrix.column(protocol).to_vec(), vec![6.0, 1.0, 17.0]);
    }

    /// Per-packet vectors match matrix rows
    #[test]
    fn test_vectors_match_rows() {
        let batch = TrafficBatch::from_json_str(CAPTURE).unwrap();
        let encoder = FeatureEncoder::new();
        let matrix = encoder.encode(&batch).unwrap();

        for (i, packet) in batch.packets.iter().enumerate() {
            let vector = encoder.encode_packet(i, packet).unwrap();
            assert_eq!(matrix.row(i).to_vec(), vector.as_slice().to_vec());
            assert_eq!(vector.get_by_name("size"), Some(matrix[[i, 0]]));
        }
    }

    /// Encoding the same batch twice yields the same matrix
    #[test]
    fn test_encoding_is_deterministic() {
        let batch = TrafficBatch::from_json_str(CAPTURE).unwrap();
        let encoder = FeatureEncoder::new();
        assert_eq!(encoder.encode(&batch).unwrap(), encoder.encode(&batch).unwrap());
    }
}
