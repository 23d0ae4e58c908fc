use std::path::Path;

use lvl_assets::{LevelDef, MemorySource, source::MaterialDef};
use lvl_core::{
    NodeId, NodeKind, SceneTree,
    material::{SurfaceMaterial, TextureFormat},
    physics::ColliderShape,
};
use lvl_scene::{ImportConfig, ImportError, Importer, MemorySink};

const LEVEL: &str = r#"{
    "name": "geo1",
    "worlds": [{
        "name": "geo1_main",
        "instances": [
            {"name": "tower_a", "entity_class": "tower", "position": [10, 0, 0]},
            {"name": "tower_b", "entity_class": "tower", "position": [20, 0, 0]},
            {"name": "hovertank", "entity_class": "hover"}
        ],
        "terrain": {
            "name": "ground",
            "positions": [[0, 0, 0], [4, 0, 0], [0, 0, 4]],
            "uvs": [[0, 0], [1, 0], [0, 1]],
            "indices": [0, 1, 2],
            "blend_map": {"dim": 1, "layers": 5, "weights": [1, 2, 3, 4, 5]},
            "layer_textures": ["grass", "missing_layer"]
        },
        "sky_name": "geo_sky"
    }],
    "models": [
        {
            "name": "tower",
            "bones": [
                {"name": "bone_root"},
                {"name": "hp1", "parent": "bone_root", "position": [0, 5, 0]}
            ],
            "segments": [
                {
                    "bone": "bone_root", "topology": "trianglestrip",
                    "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0], [1, 1, 0]],
                    "normals": [[0, 0, 1], [0, 0, 1], [0, 0, 1], [0, 0, 1]],
                    "uvs": [[0, 0], [1, 0], [0, 1], [1, 1]],
                    "indices": [0, 1, 2, 3],
                    "material": {"textures": ["wall", "wall_normal"], "flags": "TRANSPARENT"}
                },
                {
                    "topology": "trianglelist",
                    "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
                    "normals": [[0, 0, 1], [0, 0, 1], [0, 0, 1]],
                    "uvs": [[0, 0], [1, 0], [0, 1]],
                    "indices": [0, 1, 2],
                    "material": {"textures": ["wall"]}
                }
            ],
            "collision_primitives": [
                {"kind": "cube", "half_extents": [1, 2, 3],
                 "parent": "bone_root", "mask": "ORDNANCE"},
                {"kind": "sphere", "radius": 1, "parent": "bone_root", "mask": "SOLDIER"}
            ],
            "collision_mesh": {"positions": [[0, 0, 0], [1, 0, 0], [0, 0, 1]], "indices": [0, 1, 2]}
        },
        {
            "name": "broken",
            "segments": [{
                "bone": "", "topology": "trianglelist",
                "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
                "normals": [[0, 0, 1], [0, 0, 1], [0, 0, 1]],
                "uvs": [[0, 0], [1, 0]],
                "indices": [0, 1, 2]
            }]
        },
        {"name": "dome", "bones": [{"name": "dome_bone"}]},
        {"name": "moon", "bones": [{"name": "moon_bone"}]}
    ],
    "entity_classes": [
        {"name": "tower", "base": "building", "properties": [
            {"name": "GeometryName", "value": "tower"},
            {"name": "OverrideTexture", "value": "skin"},
            {"name": "FoleyFXGroup", "value": "stone"},
            {"hash": 12345, "value": "whatever"}
        ]},
        {"name": "flag", "base": "prop", "properties": []},
        {"name": "banner", "base": "prop", "properties": []},
        {"name": "tower_flag", "base": "building", "properties": [
            {"name": "GeometryName", "value": "tower"},
            {"name": "AttachODF", "value": "flag"},
            {"name": "AttachToHardpoint", "value": "hp1"}
        ]},
        {"name": "tower_lost_flag", "base": "building", "properties": [
            {"name": "GeometryName", "value": "tower"},
            {"name": "AttachODF", "value": "flag"},
            {"name": "AttachToHardpoint", "value": "hp_nowhere"}
        ]},
        {"name": "overwritten", "base": "building", "properties": [
            {"name": "GeometryName", "value": "tower"},
            {"name": "AttachODF", "value": "flag"},
            {"name": "AttachODF", "value": "banner"},
            {"name": "AttachToHardpoint", "value": "hp1"},
            {"name": "AttachToHardpoint", "value": "hp2"},
            {"name": "AttachODF", "value": "flag"}
        ]},
        {"name": "mirror", "base": "prop", "properties": [
            {"name": "AttachODF", "value": "mirror"},
            {"name": "AttachToHardpoint", "value": "hp1"}
        ]},
        {"name": "broken", "base": "prop", "properties": [
            {"name": "GeometryName", "value": "broken"}
        ]},
        {"name": "hover", "base": "hover", "properties": []}
    ],
    "textures": [
        {"name": "wall", "width": 1, "height": 1, "rgba": [255, 0, 0, 255]},
        {"name": "wall_normal", "width": 1, "height": 1, "rgba": [128, 128, 255, 255]},
        {"name": "skin", "width": 1, "height": 1, "rgba": [0, 255, 0, 255]},
        {"name": "grass", "width": 1, "height": 1, "rgba": [0, 128, 0, 255]},
        {"name": "torn", "width": 2, "height": 2, "rgba": [1, 2, 3, 4]}
    ],
    "configs": [{"name": "geo_sky", "fields": [
        {"name": "DomeInfo", "scope": [
            {"name": "DomeModel", "scope": [{"name": "Geometry", "values": ["dome"]}]}
        ]},
        {"name": "SkyObject", "values": ["moon"]}
    ]}]
}"#;

fn source() -> MemorySource {
    let level: LevelDef = serde_json::from_str(LEVEL).unwrap();
    MemorySource::new(level)
}

fn config() -> ImportConfig {
    ImportConfig::default().with_output_dir("out")
}

fn child_names(tree: &SceneTree, id: NodeId) -> Vec<&str> {
    tree.children(id).iter().filter_map(|&c| tree.name(c)).collect()
}

#[test]
fn level_is_persisted_with_worlds_as_references() {
    let source = source();
    let mut sink = MemorySink::new();
    {
        let mut importer = Importer::new(&source, &mut sink, config());
        let root = importer.import_level().unwrap();
        let tree = importer.tree();

        assert_eq!(tree.name(root), Some("geo1"));
        let world = tree.find_descendant(root, "geo1_main").unwrap();
        assert_eq!(child_names(tree, world), ["tower_a", "tower_b", "ground", "skydome"]);
        assert!(tree.is_persisted_unit(world));

        let tower = tree.find_descendant(world, "tower_b").unwrap();
        assert_eq!(tree.get(tower).unwrap().transform.translation.x, 20.0);
    }

    assert_eq!(sink.prepared, [Path::new("out")]);
    let level = sink.scene("out/geo1.scene").unwrap();
    assert_eq!(level.nodes().len(), 2);
    assert_eq!(
        level.nodes()[1].instance.as_ref().map(|s| s.path.as_str()),
        Some("out/geo1_main.scene")
    );
    assert!(sink.scene("out/geo1_main.scene").is_some());
    assert!(sink.scene("out/tower.scene").is_some());
    assert!(sink.scene("out/hover.scene").is_none());
}

#[test]
fn entity_classes_build_once_and_instantiate_fresh() {
    let source = source();
    let mut sink = MemorySink::new();
    let mut importer = Importer::new(&source, &mut sink, config());

    let a = importer.import_entity_class("tower").unwrap();
    let b = importer.import_entity_class("tower").unwrap();
    assert_ne!(a, b);

    let stats = importer.cache().scenes.stats();
    assert_eq!((stats.builds, stats.hits), (1, 1));

    let tree = importer.tree();
    // Only the two instances remain, the template is gone
    assert_eq!(tree.len(), tree.walk(a).len() + tree.walk(b).len());
    assert!(tree.find_descendant(a, "hp1").is_some());
    assert_ne!(tree.find_descendant(a, "hp1"), tree.find_descendant(b, "hp1"));
}

#[test]
fn model_population_builds_meshes_bones_and_collision() {
    let source = source();
    let mut sink = MemorySink::new();
    let mut importer = Importer::new(&source, &mut sink, config());
    let tower = importer.import_entity_class("tower").unwrap();
    let tree = importer.tree();

    let bone_root = tree.find_descendant(tower, "bone_root").unwrap();
    let hp1 = tree.find_descendant(tower, "hp1").unwrap();
    assert_eq!(tree.parent(hp1), Some(bone_root));

    let bone_mesh = tree.find_descendant(tower, "tower_bone_root_mesh").unwrap();
    assert_eq!(tree.parent(bone_mesh), Some(bone_root));
    let skinned_mesh = tree.find_descendant(tower, "tower__mesh").unwrap();
    assert_eq!(tree.parent(skinned_mesh), Some(tower));

    let NodeKind::Mesh(mesh) = &tree.get(bone_mesh).unwrap().kind else {
        panic!("expected a mesh");
    };
    assert_eq!(mesh.surfaces[0].indices, vec![0, 2, 1, 1, 2, 3]);

    // Bone segments keep their albedo, skinned ones take the override
    let albedo_of = |id: NodeId| {
        let NodeKind::Mesh(mesh) = &tree.get(id).unwrap().kind else {
            panic!("expected a mesh");
        };
        let SurfaceMaterial::Standard(handle) = &mesh.surfaces[0].material else {
            panic!("expected a standard material");
        };
        let material = importer.materials().get(handle).unwrap().clone();
        let texture = importer.textures().get(material.diffuse_texture.as_ref().unwrap()).unwrap();
        (material, texture.name.clone(), texture.format)
    };
    let (wall, name, format) = albedo_of(bone_mesh);
    assert_eq!(name, "wall");
    assert_eq!(format, TextureFormat::Rgba8UnormSrgb);
    assert!(wall.transparent);
    assert!(wall.normal_texture.is_some());
    assert_eq!(wall.settings.metallic, 0.0);
    let (_, name, _) = albedo_of(skinned_mesh);
    assert_eq!(name, "skin");

    // Only the ordnance cube makes it, the soldier sphere is masked out
    let body = tree.find_descendant(tower, "bone_root_collision_primitive").unwrap();
    assert_eq!(tree.parent(body), Some(bone_root));
    assert_eq!(tree.children(body).len(), 1);
    let shape = tree.children(body)[0];
    assert!(matches!(
        &tree.get(shape).unwrap().kind,
        NodeKind::Collider(ColliderShape::Box { size }) if size.z == 6.0
    ));
    let collision_mesh = tree.find_descendant(tower, "collision_mesh").unwrap();
    assert_eq!(tree.parent(collision_mesh), Some(tower));

    assert!(sink.textures.contains_key(Path::new("out/wall.png")));
    assert!(sink.textures.contains_key(Path::new("out/skin.png")));
    assert!(sink.materials.contains_key(Path::new("out/wall.material")));
}

#[test]
fn attachments_go_to_the_named_hardpoint() {
    let source = source();
    let mut sink = MemorySink::new();
    let mut importer = Importer::new(&source, &mut sink, config());

    let tower = importer.import_entity_class("tower_flag").unwrap();
    let lost = importer.import_entity_class("tower_lost_flag").unwrap();
    let tree = importer.tree();

    let flag = tree.find_descendant(tower, "flag").unwrap();
    assert_eq!(tree.parent(flag), tree.find_descendant(tower, "hp1"));
    assert!(tree.is_persisted_unit(flag));

    let flag = tree.find_descendant(lost, "flag").unwrap();
    assert_eq!(tree.parent(flag), Some(lost));
    drop(importer);

    // The attached class is stored as a reference to its own scene
    let packed = sink.scene("out/tower_flag.scene").unwrap();
    let reference = packed.nodes().iter().find(|n| n.name == "flag").unwrap();
    assert_eq!(reference.instance.as_ref().map(|s| s.path.as_str()), Some("out/flag.scene"));
}

#[test]
fn a_second_attach_odf_overwrites_the_first() {
    let source = source();
    let mut sink = MemorySink::new();
    let mut importer = Importer::new(&source, &mut sink, config());
    let root = importer.import_entity_class("overwritten").unwrap();
    let tree = importer.tree();

    // The second hardpoint and the trailing AttachODF have nothing to pair with
    let banner = tree.find_descendant(root, "banner").unwrap();
    assert_eq!(tree.parent(banner), tree.find_descendant(root, "hp1"));
    assert!(tree.find_descendant(root, "flag").is_none());
}

#[test]
fn unsupported_classes_build_nothing() {
    let source = source();
    let mut sink = MemorySink::new();
    let mut importer = Importer::new(&source, &mut sink, config());

    let err = importer.import_entity_class("hover").unwrap_err();
    assert!(matches!(
        err,
        ImportError::UnsupportedEntityClass { ref base, .. } if base == "hover"
    ));
    let err = importer.import_entity_class("no_such_class").unwrap_err();
    assert!(matches!(
        err,
        ImportError::UnsupportedEntityClass { ref base, .. } if base == "NONE"
    ));
    assert!(importer.tree().is_empty());
    assert!(!importer.cache().scenes.contains("hover"));
}

#[test]
fn self_attaching_class_completes() {
    let source = source();
    let mut sink = MemorySink::new();
    let mut importer = Importer::new(&source, &mut sink, config());

    let root = importer.import_entity_class("mirror").unwrap();
    assert!(importer.tree().children(root).is_empty());
    assert!(importer.cache().scenes.contains("mirror"));
}

#[test]
fn segments_with_mismatched_buffers_are_dropped() {
    let source = source();
    let mut sink = MemorySink::new();
    let mut importer = Importer::new(&source, &mut sink, config());
    let root = importer.import_entity_class("broken").unwrap();
    let tree = importer.tree();

    let mesh = tree.find_descendant(root, "broken__mesh").unwrap();
    let NodeKind::Mesh(mesh) = &tree.get(mesh).unwrap().kind else {
        panic!("expected a mesh");
    };
    assert!(mesh.surfaces.is_empty());
}

#[test]
fn terrain_binds_blend_maps_and_layers() {
    let source = source();
    let mut sink = MemorySink::new();
    {
        let mut importer = Importer::new(&source, &mut sink, config());
        let world = source_world(&source);
        let terrain = importer.import_terrain(world.terrain.as_ref().unwrap()).unwrap();
        let tree = importer.tree();

        let NodeKind::Mesh(mesh) = &tree.get(terrain).unwrap().kind else {
            panic!("expected a mesh");
        };
        let surface = &mesh.surfaces[0];
        assert_eq!(surface.indices, vec![2, 1, 0]);
        assert!(surface.uv2.is_some());
        let SurfaceMaterial::Shader(material) = &surface.material else {
            panic!("expected a shader material");
        };
        assert_eq!(material.shader, "terrain_shader");
        assert!(material.texture("BlendMap0").is_some());
        assert!(material.texture("BlendMap1").is_some());
        assert!(material.texture("BlendLayer0").is_some());
        assert!(material.texture("BlendLayer1").is_none());
    }
    let second = &sink.textures[Path::new("out/ground_blend_map_1.png")];
    assert_eq!(second.pixels, vec![5, 0, 0, 0]);
}

fn source_world(source: &MemorySource) -> &lvl_assets::source::WorldDef {
    use lvl_assets::AssetSource;
    &source.worlds()[0]
}

#[test]
fn skydome_is_scaled_and_populated() {
    let source = source();
    let mut sink = MemorySink::new();
    let mut importer = Importer::new(&source, &mut sink, config());
    let sky = importer.import_skydome(source_world(&source)).unwrap().unwrap();
    let tree = importer.tree();

    assert_eq!(tree.name(sky), Some("skydome"));
    assert_eq!(tree.get(sky).unwrap().transform.scale.x, 300.0);
    assert_eq!(child_names(tree, sky), ["dome_bone", "moon_bone"]);
}

#[test]
fn persistence_failure_leaves_class_uncached() {
    let source = source();
    let mut sink = MemorySink::new();
    sink.reject.push("out/flag.scene".into());
    let mut importer = Importer::new(&source, &mut sink, config());

    assert!(matches!(importer.import_entity_class("flag"), Err(ImportError::Sink(_))));
    assert!(!importer.cache().scenes.contains("flag"));
    assert!(importer.tree().is_empty());
}

#[test]
fn non_world_levels_are_rejected() {
    let mut level: LevelDef = serde_json::from_str(LEVEL).unwrap();
    level.is_world_level = false;
    let source = MemorySource::new(level);
    let mut sink = MemorySink::new();
    let mut importer = Importer::new(&source, &mut sink, config());
    assert!(matches!(importer.import_level(), Err(ImportError::NotWorldLevel(_))));
}

#[test]
fn unusable_output_is_fatal() {
    let source = source();
    let mut sink = MemorySink::new();
    sink.reject.push("out".into());
    let mut importer = Importer::new(&source, &mut sink, config());
    assert!(matches!(importer.import_level(), Err(ImportError::Sink(_))));
}

#[test]
fn textures_that_fail_to_save_are_not_cached() {
    let source = source();
    let mut sink = MemorySink::new();
    sink.reject.push("out/wall.png".into());
    {
        let mut importer = Importer::new(&source, &mut sink, config());
        assert!(importer.import_texture("wall", TextureFormat::Rgba8UnormSrgb).is_none());
        assert!(!importer.cache().textures.contains("wall"));
        assert!(importer.textures().is_empty());
    }
    assert!(sink.textures.is_empty());
}

#[test]
fn textures_with_the_wrong_pixel_count_are_rejected() {
    let source = source();
    let mut sink = MemorySink::new();
    {
        let mut importer = Importer::new(&source, &mut sink, config());
        assert!(importer.import_texture("torn", TextureFormat::Rgba8Unorm).is_none());
        assert!(importer.import_texture("no_such_texture", TextureFormat::Rgba8Unorm).is_none());
        assert!(!importer.cache().textures.contains("torn"));
    }
    assert!(!sink.textures.contains_key(Path::new("out/torn.png")));
}

#[test]
fn materials_are_shared_per_albedo() {
    let source = source();
    let mut sink = MemorySink::new();
    let wall = MaterialDef {
        textures: vec!["wall".into()],
        ..Default::default()
    };
    {
        let mut importer = Importer::new(&source, &mut sink, config());
        let first = importer.import_material(&wall, None).unwrap();
        let second = importer.import_material(&wall, None).unwrap();
        assert_eq!(first, second);

        // An override is keyed by the overriding texture instead
        let skinned = importer.import_material(&wall, Some("skin")).unwrap();
        assert_ne!(first, skinned);

        let stats = importer.cache().materials.stats();
        assert_eq!((stats.entries, stats.builds, stats.hits), (2, 2, 1));
        assert_eq!(importer.materials().len(), 2);
    }
    assert_eq!(sink.materials.len(), 2);
    assert!(sink.materials.contains_key(Path::new("out/wall.material")));
    assert!(sink.materials.contains_key(Path::new("out/skin.material")));
}

#[test]
fn materials_without_albedo_are_rebuilt_every_time() {
    let source = source();
    let mut sink = MemorySink::new();
    let bare = MaterialDef::default();
    {
        let mut importer = Importer::new(&source, &mut sink, config());
        let first = importer.import_material(&bare, None).unwrap();
        let second = importer.import_material(&bare, None).unwrap();
        assert_ne!(first, second);
        assert_eq!(importer.materials().len(), 2);
        assert_eq!(importer.cache().materials.stats().entries, 0);
    }
    assert!(sink.materials.is_empty());
}

#[test]
fn materials_that_fail_to_save_are_not_cached() {
    let source = source();
    let mut sink = MemorySink::new();
    sink.reject.push("out/wall.material".into());
    let wall = MaterialDef {
        textures: vec!["wall".into()],
        ..Default::default()
    };
    let mut importer = Importer::new(&source, &mut sink, config());
    assert!(importer.import_material(&wall, None).is_none());
    assert!(!importer.cache().materials.contains("wall"));
}
