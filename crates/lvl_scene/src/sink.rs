use std::{collections::BTreeMap, path::{Path, PathBuf}, rc::Rc};

use lvl_core::{
    PackedScene,
    material::{MaterialData, TextureData},
};

use crate::error::SinkError;

/// Destination for everything the importer persists.
///
/// Paths are decided by the importer; a sink only writes them.
pub trait SceneSink {
    fn prepare_output(&mut self, dir: &Path) -> Result<(), SinkError>;
    fn save_texture(&mut self, path: &Path, texture: &TextureData) -> Result<(), SinkError>;
    fn save_material(&mut self, path: &Path, material: &MaterialData) -> Result<(), SinkError>;
    fn save_scene(&mut self, path: &Path, scene: &Rc<PackedScene>) -> Result<(), SinkError>;
}

/// Keeps every persisted resource in memory. Used for dry runs and tests.
#[derive(Default)]
pub struct MemorySink {
    pub prepared: Vec<PathBuf>,
    pub textures: BTreeMap<PathBuf, TextureData>,
    pub materials: BTreeMap<PathBuf, MaterialData>,
    pub scenes: BTreeMap<PathBuf, Rc<PackedScene>>,
    /// Paths listed here fail to save
    pub reject: Vec<PathBuf>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&self, path: &Path) -> Result<(), SinkError> {
        if self.reject.iter().any(|p| p == path) {
            return Err(SinkError::Write {
                path: path.to_path_buf(),
                reason: "rejected".to_string(),
            });
        }
        Ok(())
    }

    pub fn scene(&self, path: impl AsRef<Path>) -> Option<&Rc<PackedScene>> {
        self.scenes.get(path.as_ref())
    }
}

impl SceneSink for MemorySink {
    fn prepare_output(&mut self, dir: &Path) -> Result<(), SinkError> {
        if self.reject.iter().any(|p| p == dir) {
            return Err(SinkError::Prepare {
                path: dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "rejected"),
            });
        }
        self.prepared.push(dir.to_path_buf());
        Ok(())
    }

    fn save_texture(&mut self, path: &Path, texture: &TextureData) -> Result<(), SinkError> {
        self.check(path)?;
        self.textures.insert(path.to_path_buf(), texture.clone());
        Ok(())
    }

    fn save_material(&mut self, path: &Path, material: &MaterialData) -> Result<(), SinkError> {
        self.check(path)?;
        self.materials.insert(path.to_path_buf(), material.clone());
        Ok(())
    }

    fn save_scene(&mut self, path: &Path, scene: &Rc<PackedScene>) -> Result<(), SinkError> {
        self.check(path)?;
        self.scenes.insert(path.to_path_buf(), Rc::clone(scene));
        Ok(())
    }
}
