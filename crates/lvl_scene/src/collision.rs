use log::{debug, warn};
use lvl_assets::source::{CollisionMask, CollisionMeshDef, CollisionPrimitiveDef, PrimitiveShape};
use lvl_core::{
    NodeId, NodeKind, SceneError, SceneTree,
    physics::{ColliderShape, PhysicsBody},
    transform::Transform,
};

fn primitive_shape(shape: &PrimitiveShape) -> Option<ColliderShape> {
    match *shape {
        PrimitiveShape::Cube { half_extents } => Some(ColliderShape::from_half_extents(
            half_extents.x,
            half_extents.y,
            half_extents.z,
        )),
        PrimitiveShape::Cylinder { radius, height } => {
            Some(ColliderShape::Cylinder { radius, height })
        }
        PrimitiveShape::Sphere { radius } => Some(ColliderShape::Sphere { radius }),
        PrimitiveShape::Other { .. } => None,
    }
}

/// Adds a static body with one shape for every primitive matching `mask`.
/// Each body hangs off the first descendant of `root` named after the
/// primitive's parent. Returns the number of bodies created.
pub fn build_primitives(
    tree: &mut SceneTree,
    root: NodeId,
    primitives: &[CollisionPrimitiveDef],
    mask: CollisionMask,
) -> Result<usize, SceneError> {
    let mut created = 0;
    for primitive in primitives.iter().filter(|p| p.mask.intersects(mask)) {
        let Some(shape) = primitive_shape(&primitive.shape) else {
            warn!("Skipping unsupported collision primitive {:?}", primitive.shape);
            continue;
        };
        let parent_name = &primitive.parent;

        let body = tree.spawn_with_transform(
            format!("{parent_name}_collision_primitive"),
            Transform::from_translation_rotation(primitive.position, primitive.rotation),
            NodeKind::Body(PhysicsBody::Static),
        );
        match tree.find_descendant(root, parent_name) {
            Some(parent) => {
                debug!("Attaching collision primitive to {parent_name}");
                tree.attach(parent, body)?;
            }
            None => {
                warn!(
                    "Could not find parent node {parent_name}; \
                     attaching collision primitive to model root"
                );
                tree.attach(root, body)?;
            }
        }

        let collider =
            tree.spawn(format!("{parent_name}_collision_shape"), NodeKind::Collider(shape));
        tree.attach(body, collider)?;
        created += 1;
    }
    Ok(created)
}

/// Adds the `collision_mesh` body under `root` when the mesh has any triangles.
pub fn build_collision_mesh(
    tree: &mut SceneTree,
    root: NodeId,
    mesh: &CollisionMeshDef,
) -> Result<Option<NodeId>, SceneError> {
    if mesh.indices.is_empty() {
        return Ok(None);
    }

    let mut faces = Vec::with_capacity(mesh.indices.len());
    let mut dropped = 0;
    for tri in mesh.indices.chunks(3) {
        let corners: Option<Vec<_>> =
            tri.iter().map(|&i| mesh.positions.get(i as usize).copied()).collect();
        match corners {
            Some(corners) if corners.len() == 3 => faces.extend(corners),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!("Dropped {dropped} collision mesh triangles with invalid indices");
    }

    let body = tree.spawn("collision_mesh", NodeKind::Body(PhysicsBody::Static));
    tree.attach(root, body)?;
    let shape = tree.spawn(
        "collision_mesh_shape",
        NodeKind::Collider(ColliderShape::ConcavePolygon {
            faces,
            backface_collision: true,
        }),
    );
    tree.attach(body, shape)?;
    Ok(Some(body))
}
