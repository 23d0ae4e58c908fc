use std::collections::HashMap;

use log::warn;
use lvl_assets::source::BoneDef;
use lvl_core::{NodeId, NodeKind, SceneError, SceneTree, transform::Transform};

/// Turns a flat bone list into a hierarchy of spatial nodes under `root`.
///
/// Bones are first all attached to `root`, then moved under their parent
/// once every bone exists, so parents may appear after their children in
/// the list. Returns the bone nodes by name.
pub fn build_skeleton(
    tree: &mut SceneTree,
    root: NodeId,
    bones: &[BoneDef],
) -> Result<HashMap<String, NodeId>, SceneError> {
    let mut named = HashMap::with_capacity(bones.len());
    let mut nodes = Vec::with_capacity(bones.len());
    for bone in bones {
        let node = tree.spawn(bone.name.clone(), NodeKind::Spatial);
        tree.attach(root, node)?;
        nodes.push(node);
        if named.contains_key(&bone.name) {
            warn!("Duplicate bone {}; keeping the first one for lookups", bone.name);
        } else {
            named.insert(bone.name.clone(), node);
        }
    }

    for (bone, &node) in bones.iter().zip(&nodes) {
        if !bone.parent.is_empty() {
            match named.get(&bone.parent) {
                Some(&parent) => {
                    if let Err(e) = tree.attach(parent, node) {
                        warn!("Bone {} cannot be parented to {}: {e}", bone.name, bone.parent);
                    }
                }
                None => warn!(
                    "Bone {} references a parent {} that does not exist",
                    bone.name, bone.parent
                ),
            }
        }
        let transform = Transform::from_translation_rotation(bone.position, bone.rotation);
        tree.set_transform(node, transform)?;
    }
    Ok(named)
}
