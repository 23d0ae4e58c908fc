use std::path::PathBuf;

use lvl_assets::AssetError;
use lvl_scene::ImportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not start the io runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Import(#[from] ImportError),
}
