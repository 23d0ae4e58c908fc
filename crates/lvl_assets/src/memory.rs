use std::collections::HashMap;

use serde::Deserialize;

use crate::{
    error::AssetError,
    hash::fnv1a,
    source::{AssetSource, ConfigDef, EntityClassDef, ModelDef, TextureDef, WorldDef},
};

/// Serialized form of a whole level container.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct LevelDef {
    pub name: String,
    #[serde(default = "yes")]
    pub is_world_level: bool,
    #[serde(default)]
    pub worlds: Vec<WorldDef>,
    #[serde(default)]
    pub models: Vec<ModelDef>,
    #[serde(default)]
    pub entity_classes: Vec<EntityClassDef>,
    #[serde(default)]
    pub textures: Vec<TextureDef>,
    #[serde(default)]
    pub configs: Vec<ConfigDef>,
}

fn yes() -> bool {
    true
}

/// An [`AssetSource`] held entirely in memory.
///
/// Lookups mirror the container's: models and textures by name, entity
/// classes and configs by the hash of their name. The first definition of a
/// duplicated name wins.
#[derive(Debug, Default)]
pub struct MemorySource {
    name: String,
    is_world_level: bool,
    worlds: Vec<WorldDef>,
    models: HashMap<String, ModelDef>,
    entity_classes: HashMap<u32, EntityClassDef>,
    textures: HashMap<String, TextureDef>,
    configs: HashMap<u32, ConfigDef>,
}

impl MemorySource {
    pub fn new(level: LevelDef) -> Self {
        let mut source = MemorySource {
            name: level.name,
            is_world_level: level.is_world_level,
            worlds: level.worlds,
            ..Default::default()
        };
        for model in level.models {
            source.models.entry(model.name.clone()).or_insert(model);
        }
        for class in level.entity_classes {
            source.entity_classes.entry(fnv1a(&class.name)).or_insert(class);
        }
        for texture in level.textures {
            source.textures.entry(texture.name.clone()).or_insert(texture);
        }
        for config in level.configs {
            if let Some(hash) = config.hash() {
                source.configs.entry(hash).or_insert(config);
            }
        }
        source
    }

    pub fn from_json(path: &str, text: &str) -> Result<Self, AssetError> {
        let level: LevelDef = serde_json::from_str(text).map_err(|source| AssetError::Parse {
            path: path.to_string(),
            source,
        })?;
        Ok(Self::new(level))
    }
}

impl AssetSource for MemorySource {
    fn level_name(&self) -> &str {
        &self.name
    }

    fn is_world_level(&self) -> bool {
        self.is_world_level
    }

    fn worlds(&self) -> &[WorldDef] {
        &self.worlds
    }

    fn find_model(&self, name: &str) -> Option<&ModelDef> {
        self.models.get(name)
    }

    fn find_entity_class(&self, name_hash: u32) -> Option<&EntityClassDef> {
        self.entity_classes.get(&name_hash)
    }

    fn find_texture(&self, name: &str) -> Option<&TextureDef> {
        self.textures.get(name)
    }

    fn find_skydome(&self, name_hash: u32) -> Option<&ConfigDef> {
        self.configs.get(&name_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::PropertyKind;

    const LEVEL: &str = r#"{
        "name": "geo1",
        "worlds": [{
            "name": "geo1_main",
            "instances": [{"name": "tower1", "entity_class": "geo_tower"}]
        }],
        "models": [{"name": "geo_tower"}],
        "entity_classes": [{
            "name": "geo_tower",
            "base": "building",
            "properties": [{"name": "GeometryName", "value": "geo_tower"}]
        }],
        "configs": [{"name": "geo", "fields": [{"name": "DomeInfo"}]}]
    }"#;

    #[test]
    fn lookups_follow_container_keys() {
        let source = MemorySource::from_json("geo1.json", LEVEL).unwrap();
        assert_eq!(source.level_name(), "geo1");
        assert!(source.is_world_level());
        assert_eq!(source.worlds()[0].instances[0].name, "tower1");
        assert!(source.find_model("geo_tower").is_some());

        let class = source.find_entity_class(fnv1a("GEO_TOWER")).unwrap();
        assert_eq!(class.first_value(PropertyKind::GEOMETRY_NAME), Some("geo_tower"));

        let sky = source.find_skydome(fnv1a("geo")).unwrap();
        assert!(sky.field(fnv1a("DomeInfo")).is_some());
        assert!(source.find_texture("missing").is_none());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = MemorySource::from_json("bad.json", "{").unwrap_err();
        assert!(matches!(err, AssetError::Parse { .. }));
    }
}
