use log::{debug, warn};
use lvl_assets::{geometry::build_segment_surface, source::SegmentDef};
use lvl_core::{NodeId, NodeKind, material::SurfaceMaterial, mesh::Mesh};

use crate::{
    assembler::Importer,
    collision::{build_collision_mesh, build_primitives},
    error::ImportError,
    skeleton::build_skeleton,
};

// Segments grouped by owning bone, in order of first appearance
fn group_by_bone(segments: &[SegmentDef]) -> Vec<(&str, Vec<&SegmentDef>)> {
    let mut groups: Vec<(&str, Vec<&SegmentDef>)> = Vec::new();
    for segment in segments {
        match groups.iter_mut().find(|(bone, _)| *bone == segment.bone) {
            Some((_, group)) => group.push(segment),
            None => groups.push((segment.bone.as_str(), vec![segment])),
        }
    }
    groups
}

impl Importer<'_> {
    /// Builds the skeleton, meshes and collision of `model_name` under `root`.
    /// A model missing from the source only logs a warning.
    ///
    /// `override_texture` replaces the albedo of skinned segments, the ones
    /// not tied to a bone.
    pub fn populate_model(
        &mut self,
        root: NodeId,
        model_name: &str,
        override_texture: Option<&str>,
    ) -> Result<(), ImportError> {
        debug!("Populating model {model_name}");
        let source = self.source;
        let Some(model) = source.find_model(model_name) else {
            warn!("Could not find model {model_name}");
            return Ok(());
        };

        build_skeleton(&mut self.tree, root, &model.bones)?;

        for (bone, segments) in group_by_bone(&model.segments) {
            let mut surfaces = Vec::with_capacity(segments.len());
            for segment in segments {
                let mut surface = match build_segment_surface(segment) {
                    Ok(surface) => surface,
                    Err(e) => {
                        warn!("Skipping segment of {model_name}: {e}");
                        continue;
                    }
                };
                let albedo_override = if bone.is_empty() { override_texture } else { None };
                surface.material = self
                    .import_material(&segment.material, albedo_override)
                    .map(SurfaceMaterial::Standard)
                    .unwrap_or_default();
                surfaces.push(surface);
            }

            let mesh_name = format!("{model_name}_{bone}_mesh");
            let mesh = self.tree.spawn(mesh_name.clone(), NodeKind::Mesh(Mesh { surfaces }));
            let bone_node = if bone.is_empty() {
                None
            } else {
                self.tree.find_descendant(root, bone)
            };
            match bone_node {
                Some(parent) => {
                    debug!("Attaching mesh {mesh_name} to {bone}");
                    self.tree.attach(parent, mesh)?;
                }
                None => {
                    if !bone.is_empty() {
                        warn!(
                            "Could not find bone node {bone}; attaching {mesh_name} to model root"
                        );
                    }
                    self.tree.attach(root, mesh)?;
                }
            }
        }

        let mask = self.config.collision_mask;
        build_primitives(&mut self.tree, root, &model.collision_primitives, mask)?;
        build_collision_mesh(&mut self.tree, root, &model.collision_mesh)?;
        Ok(())
    }
}
