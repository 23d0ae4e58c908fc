//! Read side of the importer: the asset source boundary, name hashing, and
//! geometry normalization of raw segment and terrain buffers.

pub mod error;
pub mod geometry;
pub mod hash;
pub mod loader;
pub mod memory;
pub mod source;
pub mod terrain;

pub use error::{AssetError, GeometryError};
pub use hash::{PropertyKind, fnv1a};
pub use loader::{LevelLoader, PendingLevel};
pub use memory::{LevelDef, MemorySource};
pub use source::AssetSource;
