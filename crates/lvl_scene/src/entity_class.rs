use std::rc::Rc;

use log::{debug, warn};
use lvl_assets::{PropertyKind, fnv1a, source::EntityClassDef};
use lvl_core::{NodeId, NodeKind, PackedScene};

use crate::{assembler::Importer, error::ImportError};

/// Base classes whose instances can be turned into static scenes.
pub const SUPPORTED_BASE_CLASSES: [&str; 8] = [
    "door",
    "animatedprop",
    "prop",
    "building",
    "destructablebuilding",
    "armedbuilding",
    "animatedbuilding",
    "commandpost",
];

/// Where the property scan stands with respect to attachments: an
/// `AttachODF` names the class to attach, the next `AttachToHardpoint`
/// says where.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttachState {
    #[default]
    Idle,
    PendingAttachment(String),
}

impl Importer<'_> {
    /// Returns a fresh instance of entity class `name`, building, persisting
    /// and caching its scene the first time it is asked for.
    pub fn import_entity_class(&mut self, name: &str) -> Result<NodeId, ImportError> {
        debug!("Importing EntityClass {name}");
        if let Some(scene) = self.cache.scenes.get(name) {
            return Ok(scene.instantiate(&mut self.tree)?);
        }
        if self.building.iter().any(|b| b == name) {
            return Err(ImportError::CyclicAttachment(name.to_string()));
        }

        let source = self.source;
        let class = source.find_entity_class(fnv1a(name));
        let base = class.map_or("NONE", |c| c.base.as_str());
        let Some(class) = class.filter(|_| SUPPORTED_BASE_CLASSES.contains(&base)) else {
            warn!("Cannot import entity class {name} of unknown base class {base}");
            return Err(ImportError::UnsupportedEntityClass {
                name: name.to_string(),
                base: base.to_string(),
            });
        };

        debug!("Creating entity class {name} scene");
        // Attachments carry no name of their own, the class name is the default
        let root = self.tree.spawn(name, NodeKind::Spatial);
        self.building.push(name.to_string());
        let built = self
            .apply_properties(root, class)
            .and_then(|()| self.persist_scene(root, name));
        self.building.pop();
        // The template itself never leaves the importer, only its instances
        self.tree.remove_subtree(root)?;

        let scene: Rc<PackedScene> = built?;
        self.cache.scenes.insert(name, Rc::clone(&scene));
        Ok(scene.instantiate(&mut self.tree)?)
    }

    fn apply_properties(
        &mut self,
        root: NodeId,
        class: &EntityClassDef,
    ) -> Result<(), ImportError> {
        let mut state = AttachState::Idle;
        for property in &class.properties {
            let value = property.value.as_str();
            match PropertyKind::from_hash(property.hash) {
                PropertyKind::GeometryName => {
                    debug!("Attaching model {value} to {}", class.name);
                    let override_texture = class
                        .first_value(PropertyKind::OVERRIDE_TEXTURE)
                        .filter(|t| !t.is_empty());
                    self.populate_model(root, value, override_texture)?;
                }
                PropertyKind::AttachOdf => {
                    state = if value.is_empty() {
                        AttachState::Idle
                    } else {
                        AttachState::PendingAttachment(value.to_string())
                    };
                }
                PropertyKind::AttachToHardpoint => match std::mem::take(&mut state) {
                    AttachState::PendingAttachment(child) => {
                        self.attach_to_hardpoint(root, &child, value)?
                    }
                    AttachState::Idle => {
                        warn!("Skipping AttachToHardpoint {value} not preceded by an AttachODF")
                    }
                },
                PropertyKind::AnimationName | PropertyKind::Animation => {
                    debug!("Skipping animation {value}");
                }
                PropertyKind::SoldierCollision
                | PropertyKind::OrdnanceCollision
                | PropertyKind::OverrideTexture
                | PropertyKind::FoleyFxGroup => {}
                PropertyKind::Unknown(hash) => {
                    warn!("Skipping unknown property {hash} (hash) = {value}");
                }
            }
        }
        if let AttachState::PendingAttachment(child) = state {
            warn!(
                "Skipping AttachODF property {child} not followed by an AttachToHardpoint property"
            );
        }
        Ok(())
    }

    fn attach_to_hardpoint(
        &mut self,
        root: NodeId,
        child: &str,
        hardpoint: &str,
    ) -> Result<(), ImportError> {
        debug!("Attaching {child} to hardpoint {hardpoint}");
        let target = match self.tree.find_descendant(root, hardpoint) {
            Some(node) => node,
            None => {
                warn!("AttachToHardpoint child {hardpoint} not found; attaching to root");
                root
            }
        };
        match self.import_entity_class(child) {
            Ok(node) => self.tree.attach(target, node)?,
            Err(e) => warn!("Failed to attach {child} to {hardpoint}: {e}"),
        }
        Ok(())
    }
}
