//! Crate-level error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ObjError;

/// Errors produced by the viewer outside the camera core.
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse mesh {label}: {source}")]
    Mesh {
        label: String,
        #[source]
        source: ObjError,
    },
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
    #[error("failed to spawn loader thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),
    #[error("unknown interaction mode `{0}` (expected `mouse` or `fly`)")]
    UnknownMode(String),
    #[error("unknown view volume `{0}` (expected `perspective` or `orthographic`)")]
    UnknownViewVolume(String),
    #[error("GPU error: {0}")]
    Gpu(String),
    #[error("window error: {0}")]
    Window(String),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
