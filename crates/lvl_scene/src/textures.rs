use log::{debug, warn};
use lvl_assets::source::{MaterialDef, MaterialFlags};
use lvl_core::{
    Handle,
    material::{MaterialData, MaterialSettings, TextureData, TextureFormat},
};

use crate::{
    assembler::Importer,
    error::{ImportError, SinkError},
};

impl Importer<'_> {
    /// Texture handle for `name`, converted and persisted on first use.
    ///
    /// Textures are cached by name only, so the format of the first request
    /// wins.
    pub fn import_texture(
        &mut self,
        name: &str,
        format: TextureFormat,
    ) -> Option<Handle<TextureData>> {
        let Importer {
            source,
            sink,
            config,
            cache,
            textures,
            ..
        } = self;

        let built = cache.textures.get_or_build(name, || {
            let def = source
                .find_texture(name)
                .ok_or_else(|| ImportError::TextureNotFound(name.to_string()))?;
            let data = TextureData {
                name: def.name.clone(),
                pixels: def.rgba.clone(),
                width: def.width,
                height: def.height,
                format,
            };
            if data.pixels.len() != data.expected_len() {
                return Err(ImportError::InvalidTexture {
                    name: name.to_string(),
                    expected: data.expected_len(),
                    actual: data.pixels.len(),
                });
            }

            debug!("Importing texture {name}");
            let path = config.resource_path(name, "png");
            sink.save_texture(&path, &data)?;
            Ok(textures.add(data))
        });

        match built {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to import texture {name}: {e}");
                None
            }
        }
    }

    /// Standard material for a segment, cached by albedo texture name.
    /// `albedo_override` replaces the material's own albedo slot.
    pub fn import_material(
        &mut self,
        material: &MaterialDef,
        albedo_override: Option<&str>,
    ) -> Option<Handle<MaterialData>> {
        let Some(albedo) = albedo_override.or(material.albedo()) else {
            warn!("Failed to get albedo map texture for material");
            let data = self.build_material(material, None);
            return Some(self.materials.add(data));
        };

        // Building a material only touches the texture table
        let mut table = std::mem::take(&mut self.cache.materials);
        let built = table.get_or_build(albedo, || {
            let data = self.build_material(material, Some(albedo));
            let path = self.config.resource_path(albedo, "material");
            self.sink.save_material(&path, &data)?;
            Ok::<_, SinkError>(self.materials.add(data))
        });
        self.cache.materials = table;

        match built {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to save material {albedo}: {e}");
                None
            }
        }
    }

    fn build_material(&mut self, material: &MaterialDef, albedo: Option<&str>) -> MaterialData {
        let diffuse_texture =
            albedo.and_then(|name| self.import_texture(name, TextureFormat::Rgba8UnormSrgb));

        let normal_texture = match material.normal_map() {
            Some(name) => self.import_texture(name, TextureFormat::Rgba8Unorm),
            None => {
                if material.flags.contains(MaterialFlags::BUMP_MAP) {
                    warn!("Failed to get normal map texture for material");
                }
                None
            }
        };

        MaterialData {
            name: albedo.unwrap_or_default().to_string(),
            settings: MaterialSettings {
                specular: 0.0,
                metallic: 0.0,
                ..Default::default()
            },
            diffuse_texture,
            normal_texture,
            transparent: material.flags.contains(MaterialFlags::TRANSPARENT),
        }
    }
}
