use std::rc::Rc;

use log::{debug, error, info, warn};
use lvl_assets::{
    fnv1a,
    source::{AssetSource, FieldDef, TerrainDef, WorldDef},
    terrain::{build_terrain_surface, repack_blend_map},
};
use lvl_core::{
    Assets, NodeId, NodeKind, PackedScene, SceneTree,
    material::{MaterialData, ShaderMaterial, SurfaceMaterial, TextureData, TextureFormat},
    mesh::Mesh,
    transform::Transform,
};

use crate::{cache::ResourceCache, config::ImportConfig, error::ImportError, sink::SceneSink};

/// Drives one import run from an [`AssetSource`] into a [`SceneSink`].
///
/// Everything built lives in the importer's [`SceneTree`]; resources are
/// stored in its asset tables and referenced by handle.
pub struct Importer<'a> {
    pub(crate) source: &'a dyn AssetSource,
    pub(crate) sink: &'a mut dyn SceneSink,
    pub(crate) config: ImportConfig,
    pub(crate) tree: SceneTree,
    pub(crate) cache: ResourceCache,
    pub(crate) textures: Assets<TextureData>,
    pub(crate) materials: Assets<MaterialData>,
    // Entity classes currently being built, innermost last
    pub(crate) building: Vec<String>,
}

impl<'a> Importer<'a> {
    pub fn new(
        source: &'a dyn AssetSource,
        sink: &'a mut dyn SceneSink,
        config: ImportConfig,
    ) -> Self {
        Self {
            source,
            sink,
            config,
            tree: SceneTree::new(),
            cache: ResourceCache::default(),
            textures: Assets::default(),
            materials: Assets::default(),
            building: Vec::new(),
        }
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn textures(&self) -> &Assets<TextureData> {
        &self.textures
    }

    pub fn materials(&self) -> &Assets<MaterialData> {
        &self.materials
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Imports every world of the level under one root named after the
    /// level and persists the result. Returns the level root.
    pub fn import_level(&mut self) -> Result<NodeId, ImportError> {
        let source = self.source;
        let level = source.level_name();
        if !source.is_world_level() {
            error!("{level} is not a world level");
            return Err(ImportError::NotWorldLevel(level.to_string()));
        }
        if let Err(e) = self.sink.prepare_output(&self.config.output_dir) {
            error!("{e}");
            return Err(e.into());
        }

        info!("Importing level {level} into {}", self.config.output_dir.display());
        let root = self.tree.spawn(level, NodeKind::Group);
        for world in source.worlds() {
            match self.import_world(world) {
                Ok(node) => self.tree.attach(root, node)?,
                Err(e) => warn!("Failed to import world {}: {e}", world.name),
            }
        }

        let scene = self.persist_scene(root, level)?;
        self.tree.set_scene_source(root, scene)?;
        self.cache.log_stats();
        info!("Imported level {level} ({} nodes)", self.tree.walk(root).len());
        Ok(root)
    }

    pub(crate) fn persist_scene(
        &mut self,
        root: NodeId,
        name: &str,
    ) -> Result<Rc<PackedScene>, ImportError> {
        let path = self.config.resource_path(name, "scene");
        debug!("Saving packed scene {}", path.display());
        let scene = Rc::new(PackedScene::pack(&self.tree, root, path.to_string_lossy())?);
        self.sink.save_scene(&path, &scene)?;
        Ok(scene)
    }

    /// Builds one world: instances, terrain and skydome. The world is
    /// persisted on its own and its root marked as a persisted unit.
    pub fn import_world(&mut self, world: &WorldDef) -> Result<NodeId, ImportError> {
        info!("Importing world {}", world.name);
        let root = self.tree.spawn(world.name.clone(), NodeKind::Group);
        let built = self
            .populate_world(root, world)
            .and_then(|()| self.persist_scene(root, &world.name));
        match built {
            Ok(scene) => {
                self.tree.set_scene_source(root, scene)?;
                Ok(root)
            }
            Err(e) => {
                self.tree.remove_subtree(root)?;
                Err(e)
            }
        }
    }

    fn populate_world(&mut self, root: NodeId, world: &WorldDef) -> Result<(), ImportError> {
        for (i, instance) in world.instances.iter().enumerate() {
            debug!("Importing instance {i}/{} {}", world.instances.len(), instance.name);
            match self.import_entity_class(&instance.entity_class) {
                Ok(node) => {
                    debug!("Attaching {} to world", instance.name);
                    self.tree.rename(node, instance.name.clone())?;
                    self.tree.set_transform(
                        node,
                        Transform::from_translation_rotation(instance.position, instance.rotation),
                    )?;
                    self.tree.attach(root, node)?;
                }
                Err(e) => warn!("Failed to import {}: {e}", instance.name),
            }
        }

        if let Some(terrain) = &world.terrain {
            let node = self.import_terrain(terrain)?;
            self.tree.attach(root, node)?;
        }
        if let Some(skydome) = self.import_skydome(world)? {
            self.tree.attach(root, skydome)?;
        }
        Ok(())
    }

    /// Terrain mesh node with a shader material binding the repacked blend
    /// maps and the blend layer textures.
    pub fn import_terrain(&mut self, terrain: &TerrainDef) -> Result<NodeId, ImportError> {
        debug!("Importing terrain {}", terrain.name);
        let mut surface = build_terrain_surface(terrain, &self.config.terrain_options());
        let mut material = ShaderMaterial::new(self.config.terrain_shader.clone());

        match repack_blend_map(&terrain.blend_map, &terrain.name) {
            Ok(maps) => {
                for (m, map) in maps.into_iter().enumerate() {
                    let path = self.config.resource_path(&map.name, "png");
                    match self.sink.save_texture(&path, &map) {
                        Ok(()) => {
                            material.set_texture(format!("BlendMap{m}"), self.textures.add(map))
                        }
                        Err(e) => warn!("Failed to save blend map {}: {e}", map.name),
                    }
                }
            }
            Err(e) => warn!("Skipping blend maps of {}: {e}", terrain.name),
        }

        for (i, name) in terrain.layer_textures.iter().enumerate() {
            match self.import_texture(name, TextureFormat::Rgba8UnormSrgb) {
                Some(texture) => material.set_texture(format!("BlendLayer{i}"), texture),
                None => warn!("Failed to find terrain layer image {name}"),
            }
        }

        surface.material = SurfaceMaterial::Shader(material);
        Ok(self.tree.spawn(
            terrain.name.clone(),
            NodeKind::Mesh(Mesh {
                surfaces: vec![surface],
            }),
        ))
    }

    /// Scaled `skydome` node holding the dome models and sky objects, or
    /// `None` when the level has no skydome config for this world.
    pub fn import_skydome(&mut self, world: &WorldDef) -> Result<Option<NodeId>, ImportError> {
        let source = self.source;
        let Some(config) = source.find_skydome(fnv1a(&world.sky_name)) else {
            debug!("No skydome config named {}", world.sky_name);
            return Ok(None);
        };

        let skydome = self.tree.spawn_with_transform(
            "skydome",
            Transform::default().with_uniform_scale(self.config.skydome_scale),
            NodeKind::Spatial,
        );

        let dome_models: Vec<&FieldDef> = config
            .field(fnv1a("DomeInfo"))
            .map(|info| info.fields(fnv1a("DomeModel")).collect())
            .unwrap_or_default();
        debug!("Skydome has {} dome models", dome_models.len());
        for dome in dome_models {
            self.populate_model(skydome, geometry_name(dome), None)?;
        }

        let sky_objects: Vec<&FieldDef> = config.fields(fnv1a("SkyObject")).collect();
        debug!("Skydome has {} sky objects", sky_objects.len());
        for object in sky_objects {
            self.populate_model(skydome, geometry_name(object), None)?;
        }
        Ok(Some(skydome))
    }
}

// Nested `Geometry` value, or the field's own first value when that is empty
fn geometry_name(field: &FieldDef) -> &str {
    match field.field(fnv1a("Geometry")).map(FieldDef::first_string) {
        Some(name) if !name.is_empty() => name,
        _ => field.first_string(),
    }
}
