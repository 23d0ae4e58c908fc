use std::time::Duration;

use thiserror::Error;

use crate::source::Topology;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read level {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed level description {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} took longer than {waited:?} to load")]
    LoadTimeout { path: String, waited: Duration },
    #[error("background load of {path} did not finish: {reason}")]
    LoadAborted { path: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("invalid vertex, normal, tex_uv count: {vertices} {normals} {uvs}")]
    MismatchedBuffers {
        vertices: usize,
        normals: usize,
        uvs: usize,
    },
    #[error("unsupported topology {0:?}")]
    UnsupportedTopology(Topology),
    #[error("triangle fan with only {0} indices")]
    DegenerateFan(usize),
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("blend map needs {expected} bytes, source has {actual}")]
    BlendMapTooShort { expected: usize, actual: usize },
}
