use std::path::PathBuf;

use lvl_core::SceneError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("could not prepare output directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported entity class {name} with base {base}")]
    UnsupportedEntityClass { name: String, base: String },
    #[error("entity class {0} attaches itself")]
    CyclicAttachment(String),
    #[error("level {0} is not a world level")]
    NotWorldLevel(String),
    #[error("could not find texture {0}")]
    TextureNotFound(String),
    #[error("texture {name} has {actual} bytes of pixel data, expected {expected}")]
    InvalidTexture {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}
