//! Builds a scene tree out of a level: entity-class scenes, models,
//! collision, terrain and skydomes, persisted through a [`SceneSink`].

pub mod assembler;
pub mod cache;
pub mod collision;
pub mod config;
pub mod entity_class;
pub mod error;
pub mod model;
pub mod sink;
pub mod skeleton;
pub mod textures;

pub use assembler::Importer;
pub use config::ImportConfig;
pub use entity_class::{AttachState, SUPPORTED_BASE_CLASSES};
pub use error::{ImportError, SinkError};
pub use sink::{MemorySink, SceneSink};
