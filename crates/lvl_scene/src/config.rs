use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use lvl_assets::{source::CollisionMask, terrain::TerrainOptions};
use serde::Deserialize;

/// Importer settings. Every field has a default, so a partial JSON file is
/// enough to override a single value.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub output_dir: PathBuf,
    pub weld_terrain_vertices: bool,
    pub weld_distance_squared: f32,
    /// Only collision primitives matching this mask become bodies
    pub collision_mask: CollisionMask,
    pub skydome_scale: f32,
    pub terrain_shader: String,
    pub load_poll_interval_ms: u64,
    pub load_timeout_secs: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("out"),
            weld_terrain_vertices: true,
            weld_distance_squared: 0.01,
            collision_mask: CollisionMask::ORDNANCE,
            skydome_scale: 300.0,
            terrain_shader: "terrain_shader".to_string(),
            load_poll_interval_ms: 1000,
            load_timeout_secs: 60,
        }
    }
}

impl ImportConfig {
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// `<output>/<name>.<ext>`
    pub fn resource_path(&self, name: &str, ext: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.{ext}"))
    }

    pub fn terrain_options(&self) -> TerrainOptions {
        TerrainOptions {
            weld_vertices: self.weld_terrain_vertices,
            weld_distance_sq: self.weld_distance_squared,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.load_poll_interval_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }
}
