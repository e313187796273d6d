//! Error handling
//!
//! Một batch lỗi là lỗi toàn bộ - không có partial result.

use serde::Serialize;
use thiserror::Error;

pub type DetectorResult<T> = Result<T, DetectorError>;

/// Stable error kind names, exposed to callers and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    SchemaError,
    DimensionError,
    ModelNotReadyError,
    ModelLoadError,
    InferenceError,
    TaskError,
    IoError,
    JsonError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SchemaError => "SchemaError",
            ErrorKind::DimensionError => "DimensionError",
            ErrorKind::ModelNotReadyError => "ModelNotReadyError",
            ErrorKind::ModelLoadError => "ModelLoadError",
            ErrorKind::InferenceError => "InferenceError",
            ErrorKind::TaskError => "TaskError",
            ErrorKind::IoError => "IoError",
            ErrorKind::JsonError => "JsonError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum DetectorError {
    // Pipeline errors
    #[error("packet {index}: field '{field}' {reason}")]
    Schema {
        index: usize,
        field: String,
        reason: String,
    },

    #[error("{context}: expected {expected}, got {actual}")]
    Dimension {
        expected: usize,
        actual: usize,
        context: String,
    },

    #[error("model is not fitted")]
    ModelNotReady,

    // Model supply errors
    #[error("model load failed: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),

    // Worker task panicked or was cancelled
    #[error("analysis task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DetectorError {
    pub fn schema(index: usize, field: &str, reason: impl Into<String>) -> Self {
        DetectorError::Schema {
            index,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn dimension(expected: usize, actual: usize, context: impl Into<String>) -> Self {
        DetectorError::Dimension {
            expected,
            actual,
            context: context.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DetectorError::Schema { .. } => ErrorKind::SchemaError,
            DetectorError::Dimension { .. } => ErrorKind::DimensionError,
            DetectorError::ModelNotReady => ErrorKind::ModelNotReadyError,
            DetectorError::ModelLoad(_) => ErrorKind::ModelLoadError,
            DetectorError::Inference(_) => ErrorKind::InferenceError,
            DetectorError::Task(_) => ErrorKind::TaskError,
            DetectorError::Io(_) => ErrorKind::IoError,
            DetectorError::Json(_) => ErrorKind::JsonError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(DetectorError::schema(0, "size", "is missing").kind(), ErrorKind::SchemaError);
        assert_eq!(DetectorError::dimension(4, 3, "feature matrix width").kind(), ErrorKind::DimensionError);
        assert_eq!(DetectorError::ModelNotReady.kind(), ErrorKind::ModelNotReadyError);
        assert_eq!(ErrorKind::ModelNotReadyError.to_string(), "ModelNotReadyError");
    }

    #[test]
    fn test_schema_message_names_packet_and_field() {
        let err = DetectorError::schema(3, "port", "is not a number");
        assert_eq!(err.to_string(), "packet 3: field 'port' is not a number");
    }

    #[tokio::test]
    async fn test_panicked_task_is_task_error() {
        let join_error = tokio::task::spawn_blocking(|| panic!("worker died")).await.unwrap_err();
        let err = DetectorError::from(join_error);

        assert_eq!(err.kind(), ErrorKind::TaskError);
        assert!(err.to_string().starts_with("analysis task failed"));
    }
}
