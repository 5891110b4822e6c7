use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    #[error("Device has no power features")]
    NoPowerFeatures,

    #[error("Unknown power instance '{instance}'")]
    UnknownInstance { instance: String },

    #[error("Unsupported function class '{function_class}'")]
    UnsupportedFunction { function_class: String },

    #[error("Failed to read snapshot {path}: {source}")]
    SnapshotRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write snapshot {path}: {source}")]
    SnapshotWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid device JSON: {0}")]
    Json(#[from] serde_json::Error),
}
