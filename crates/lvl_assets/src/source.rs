use bitflags::bitflags;
use glam::{Quat, Vec2, Vec3};
use serde::Deserialize;

use crate::hash::fnv1a;

/// Read-only access to a loaded level container.
pub trait AssetSource {
    fn level_name(&self) -> &str;
    fn is_world_level(&self) -> bool;
    fn worlds(&self) -> &[WorldDef];
    fn find_model(&self, name: &str) -> Option<&ModelDef>;
    /// Entity classes are addressed by the hash of their name
    fn find_entity_class(&self, name_hash: u32) -> Option<&EntityClassDef>;
    fn find_texture(&self, name: &str) -> Option<&TextureDef>;
    fn find_skydome(&self, name_hash: u32) -> Option<&ConfigDef>;
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    TriangleFan,
    #[serde(other)]
    Unknown,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
    #[serde(transparent)]
    pub struct CollisionMask: u8 {
        const ORDNANCE = 1 << 0;
        const VEHICLE = 1 << 1;
        const BUILDING = 1 << 2;
        const TERRAIN = 1 << 3;
        const SOLDIER = 1 << 4;
        const FLYER = 1 << 5;
    }
}

impl Default for CollisionMask {
    fn default() -> Self {
        CollisionMask::all()
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
    #[serde(transparent)]
    pub struct MaterialFlags: u32 {
        const TRANSPARENT = 1 << 2;
        const BUMP_MAP = 1 << 12;
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct InstanceDef {
    pub name: String,
    pub entity_class: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default = "identity")]
    pub rotation: Quat,
}

fn identity() -> Quat {
    Quat::IDENTITY
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct BlendMapDef {
    pub dim: u32,
    pub layers: u32,
    #[serde(default)]
    pub weights: Vec<u8>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TerrainDef {
    pub name: String,
    pub positions: Vec<Vec3>,
    #[serde(default)]
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    #[serde(default)]
    pub blend_map: BlendMapDef,
    #[serde(default)]
    pub layer_textures: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct WorldDef {
    pub name: String,
    #[serde(default)]
    pub instances: Vec<InstanceDef>,
    #[serde(default)]
    pub terrain: Option<TerrainDef>,
    #[serde(default)]
    pub sky_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BoneDef {
    pub name: String,
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default = "identity")]
    pub rotation: Quat,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct MaterialDef {
    /// Slot 0 is the albedo texture, slot 1 an optional normal map
    #[serde(default)]
    pub textures: Vec<String>,
    #[serde(default)]
    pub flags: MaterialFlags,
}

impl MaterialDef {
    pub fn albedo(&self) -> Option<&str> {
        self.textures.first().map(String::as_str).filter(|n| !n.is_empty())
    }

    pub fn normal_map(&self) -> Option<&str> {
        self.textures.get(1).map(String::as_str).filter(|n| !n.is_empty())
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct SegmentDef {
    /// Owning bone, empty for skinned segments
    #[serde(default)]
    pub bone: String,
    pub topology: Topology,
    pub positions: Vec<Vec3>,
    #[serde(default)]
    pub normals: Vec<Vec3>,
    #[serde(default)]
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    #[serde(default)]
    pub material: MaterialDef,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PrimitiveShape {
    Cube { half_extents: Vec3 },
    Cylinder { radius: f32, height: f32 },
    Sphere { radius: f32 },
    Other { code: u32 },
}

#[derive(Deserialize, Clone, Debug)]
pub struct CollisionPrimitiveDef {
    #[serde(flatten)]
    pub shape: PrimitiveShape,
    /// Name of the node the primitive hangs off
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default = "identity")]
    pub rotation: Quat,
    #[serde(default)]
    pub mask: CollisionMask,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct CollisionMeshDef {
    #[serde(default)]
    pub positions: Vec<Vec3>,
    #[serde(default)]
    pub indices: Vec<u32>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ModelDef {
    pub name: String,
    #[serde(default)]
    pub bones: Vec<BoneDef>,
    #[serde(default)]
    pub segments: Vec<SegmentDef>,
    #[serde(default)]
    pub collision_primitives: Vec<CollisionPrimitiveDef>,
    #[serde(default)]
    pub collision_mesh: CollisionMeshDef,
}

/// A hashed name as stored by the container. Descriptions may give either
/// the plain name or the raw hash.
#[derive(Deserialize, Clone, Debug)]
struct RawKey {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    hash: Option<u32>,
}

impl RawKey {
    fn resolve(&self) -> Result<u32, String> {
        match (&self.hash, &self.name) {
            (Some(hash), _) => Ok(*hash),
            (None, Some(name)) => Ok(fnv1a(name)),
            (None, None) => Err("expected either `name` or `hash`".to_string()),
        }
    }
}

#[derive(Deserialize)]
struct RawProperty {
    #[serde(flatten)]
    key: RawKey,
    #[serde(default)]
    value: String,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "RawProperty")]
pub struct PropertyDef {
    pub hash: u32,
    pub value: String,
}

impl PropertyDef {
    pub fn named(name: &str, value: impl Into<String>) -> Self {
        Self {
            hash: fnv1a(name),
            value: value.into(),
        }
    }
}

impl TryFrom<RawProperty> for PropertyDef {
    type Error = String;

    fn try_from(raw: RawProperty) -> Result<Self, Self::Error> {
        Ok(Self {
            hash: raw.key.resolve()?,
            value: raw.value,
        })
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct EntityClassDef {
    pub name: String,
    pub base: String,
    /// Order matters: attachments pair each AttachODF with the next AttachToHardpoint
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
}

impl EntityClassDef {
    pub fn first_value(&self, hash: u32) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.hash == hash)
            .map(|p| p.value.as_str())
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct TextureDef {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// RGBA8, row major
    pub rgba: Vec<u8>,
}

#[derive(Deserialize)]
struct RawField {
    #[serde(flatten)]
    key: RawKey,
    #[serde(default)]
    values: Vec<String>,
    #[serde(default)]
    scope: Vec<FieldDef>,
}

/// One field of a config file: a hashed name, its values, and a nested scope.
#[derive(Deserialize, Clone, Debug)]
#[serde(try_from = "RawField")]
pub struct FieldDef {
    pub hash: u32,
    pub values: Vec<String>,
    pub scope: Vec<FieldDef>,
}

impl TryFrom<RawField> for FieldDef {
    type Error = String;

    fn try_from(raw: RawField) -> Result<Self, Self::Error> {
        Ok(Self {
            hash: raw.key.resolve()?,
            values: raw.values,
            scope: raw.scope,
        })
    }
}

impl FieldDef {
    pub fn named(name: &str, values: Vec<String>, scope: Vec<FieldDef>) -> Self {
        Self {
            hash: fnv1a(name),
            values,
            scope,
        }
    }

    pub fn first_string(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or("")
    }

    pub fn field(&self, hash: u32) -> Option<&FieldDef> {
        self.scope.iter().find(|f| f.hash == hash)
    }

    pub fn fields(&self, hash: u32) -> impl Iterator<Item = &FieldDef> {
        self.scope.iter().filter(move |f| f.hash == hash)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ConfigDef {
    #[serde(flatten)]
    key: RawKey,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl ConfigDef {
    pub fn new(name: &str, fields: Vec<FieldDef>) -> Self {
        Self {
            key: RawKey {
                name: Some(name.to_string()),
                hash: None,
            },
            fields,
        }
    }

    pub fn hash(&self) -> Option<u32> {
        self.key.resolve().ok()
    }

    pub fn field(&self, hash: u32) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.hash == hash)
    }

    pub fn fields(&self, hash: u32) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(move |f| f.hash == hash)
    }
}
