//! Packet feature layout
//!
//! Column order of every feature matrix. Forest documents record the
//! version and hash they were trained against, so reordering, adding or
//! removing a column must bump `FEATURE_VERSION`.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::{DetectorError, DetectorResult};

pub const FEATURE_COUNT: usize = 4;

/// Packet fields, in column order
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = ["size", "protocol", "port", "frequency"];

pub const FEATURE_VERSION: u8 = 1;

/// CRC32 over the version byte and the NUL-joined field names
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    hasher.update(FEATURE_LAYOUT.join("\0").as_bytes());
    hasher.finalize()
}

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&field| field == name)
}

/// Reject a model trained against another layout
pub fn check_model_layout(version: u8, hash: u32) -> DetectorResult<()> {
    let info = LayoutInfo::current();
    if info.matches(version, hash) {
        return Ok(());
    }

    Err(DetectorError::ModelLoad(format!(
        "feature layout mismatch: model v{} ({:08x}), detector v{} ({:08x})",
        version, hash, info.version, info.hash
    )))
}

/// Layout summary logged at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_names: FEATURE_LAYOUT.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn matches(&self, version: u8, hash: u32) -> bool {
        self.version == version && self.hash == hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_layout_order_is_fixed() {
        assert_eq!(FEATURE_LAYOUT, ["size", "protocol", "port", "frequency"]);
        assert_eq!(feature_index("size"), Some(0));
        assert_eq!(feature_index("frequency"), Some(3));
        assert_eq!(feature_index("source"), None);
    }

    #[test]
    fn test_layout_hash_is_stable() {
        assert_eq!(layout_hash(), layout_hash());
        assert_eq!(LayoutInfo::current().hash, layout_hash());
    }

    #[test]
    fn test_check_model_layout() {
        assert!(check_model_layout(FEATURE_VERSION, layout_hash()).is_ok());

        let err = check_model_layout(FEATURE_VERSION + 1, layout_hash()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelLoadError);

        let err = check_model_layout(FEATURE_VERSION, layout_hash() ^ 1).unwrap_err();
        assert!(err.to_string().contains("layout mismatch"));
    }
}
