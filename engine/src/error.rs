//! Error Types
//!
//! Three failure classes surface from the terrain core:
//! - [`ConfigError`]: malformed parameters or configuration, rejected before any GPU work
//! - [`DeviceError`]: adapter/device/buffer/pipeline failures, fatal to one terrain instance
//! - [`EncodingError`]: non-finite values reaching the parameter codec
//!
//! [`TerrainError`] wraps all three for the generation path.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("terrain parameter `{field}` is not finite ({value})")]
    NonFinite { field: &'static str, value: f32 },
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to load shader artifact {path}: {source}")]
    ShaderArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no suitable GPU adapter found: {0}")]
    NoAdapter(String),
    #[error("failed to request device: {0}")]
    RequestDevice(String),
    #[error("failed to create surface: {0}")]
    CreateSurface(String),
    #[error("field buffer of {requested} bytes exceeds the device storage binding limit of {limit} bytes")]
    BufferTooLarge { requested: u64, limit: u64 },
    #[error("GPU validation error during {stage}: {message}")]
    Validation { stage: &'static str, message: String },
    #[error("GPU out of memory during {stage}: {message}")]
    OutOfMemory { stage: &'static str, message: String },
    #[error("failed to spawn generation worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum EncodingError {
    #[error("cannot encode non-finite value for `{field}` ({value})")]
    NonFinite { field: &'static str, value: f32 },
}

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("generation cancelled: terrain instance was superseded")]
    Cancelled,
}
