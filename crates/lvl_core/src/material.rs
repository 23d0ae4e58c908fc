use std::collections::BTreeMap;

use serde::Serialize;

use crate::assets::Handle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TextureFormat {
    Rgba8Unorm,     // Linear data (normal maps, blend weights)
    Rgba8UnormSrgb, // Color data (albedo)
}

#[derive(Clone, Debug)]
pub struct TextureData {
    pub name: String,
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl TextureData {
    /// Expected byte length of an RGBA8 image of this size
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaterialSettings {
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metallic: f32,
    pub specular: f32,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            roughness: 0.5,
            metallic: 0.0,
            specular: 0.0,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct MaterialData {
    pub name: String,
    pub settings: MaterialSettings,
    pub diffuse_texture: Option<Handle<TextureData>>,
    pub normal_texture: Option<Handle<TextureData>>,
    pub transparent: bool,
}

/// Material driven by a named shader with texture parameters bound by name
#[derive(Clone, Debug, Default, Serialize)]
pub struct ShaderMaterial {
    pub shader: String,
    pub textures: BTreeMap<String, Handle<TextureData>>,
}

impl ShaderMaterial {
    pub fn new(shader: impl Into<String>) -> Self {
        Self {
            shader: shader.into(),
            textures: BTreeMap::new(),
        }
    }

    pub fn set_texture(&mut self, param: impl Into<String>, texture: Handle<TextureData>) {
        self.textures.insert(param.into(), texture);
    }

    pub fn texture(&self, param: &str) -> Option<&Handle<TextureData>> {
        self.textures.get(param)
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub enum SurfaceMaterial {
    #[default]
    None,
    Standard(Handle<MaterialData>),
    Shader(ShaderMaterial),
}
