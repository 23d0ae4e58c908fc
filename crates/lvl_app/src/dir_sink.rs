use std::{fs, path::Path, rc::Rc};

use log::debug;
use lvl_core::{
    PackedScene,
    material::{MaterialData, TextureData},
};
use lvl_scene::{SceneSink, SinkError};
use serde::Serialize;

/// Writes textures as PNG and materials and scenes as JSON.
#[derive(Debug, Default)]
pub struct DirectorySink;

fn write_error(path: &Path, reason: impl ToString) -> SinkError {
    SinkError::Write {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SinkError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| write_error(path, e))?;
    fs::write(path, text).map_err(|e| write_error(path, e))
}

impl SceneSink for DirectorySink {
    fn prepare_output(&mut self, dir: &Path) -> Result<(), SinkError> {
        fs::create_dir_all(dir).map_err(|source| SinkError::Prepare {
            path: dir.to_path_buf(),
            source,
        })
    }

    fn save_texture(&mut self, path: &Path, texture: &TextureData) -> Result<(), SinkError> {
        debug!("Writing {}", path.display());
        let (width, height) = (texture.width, texture.height);
        let image = image::RgbaImage::from_raw(width, height, texture.pixels.clone())
            .ok_or_else(|| {
                let reason = format!("{} is not a {width}x{height} RGBA image", texture.name);
                write_error(path, reason)
            })?;
        image.save(path).map_err(|e| write_error(path, e))
    }

    fn save_material(&mut self, path: &Path, material: &MaterialData) -> Result<(), SinkError> {
        debug!("Writing {}", path.display());
        write_json(path, material)
    }

    fn save_scene(&mut self, path: &Path, scene: &Rc<PackedScene>) -> Result<(), SinkError> {
        debug!("Writing {}", path.display());
        write_json(path, scene.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use lvl_core::{NodeKind, SceneTree, material::TextureFormat};

    use super::*;

    #[test]
    fn writes_png_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("geo1");
        let mut sink = DirectorySink;
        sink.prepare_output(&out).unwrap();

        let texture = TextureData {
            name: "wall".into(),
            pixels: vec![255, 0, 0, 255, 0, 255, 0, 255],
            width: 2,
            height: 1,
            format: TextureFormat::Rgba8UnormSrgb,
        };
        let png = out.join("wall.png");
        sink.save_texture(&png, &texture).unwrap();
        let decoded = image::open(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.into_raw(), texture.pixels);

        let mut tree = SceneTree::new();
        let root = tree.spawn("tower", NodeKind::Spatial);
        let scene = Rc::new(PackedScene::pack(&tree, root, "tower.scene").unwrap());
        let scene_path = out.join("tower.scene");
        sink.save_scene(&scene_path, &scene).unwrap();
        let text = fs::read_to_string(scene_path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["nodes"][0]["name"], "tower");
    }

    #[test]
    fn short_pixel_buffers_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let texture = TextureData {
            name: "bad".into(),
            pixels: vec![0; 3],
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8Unorm,
        };
        let err = DirectorySink.save_texture(&dir.path().join("bad.png"), &texture);
        assert!(matches!(err, Err(SinkError::Write { .. })));
    }
}
