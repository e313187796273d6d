//! Alerts Module
//!
//! Áp threshold lên output của classifier, sinh AlertRecord cho downstream.
//! Không dedup, không escalate - đó là việc của alert consumer.

pub mod types;
pub mod generator;

pub use types::AlertRecord;
pub use generator::AlertGenerator;
