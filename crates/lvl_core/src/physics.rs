use glam::Vec3;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PhysicsBody {
    Static,
}

/// Collision shape attached to a body. Sizes are full extents, not half extents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColliderShape {
    Box { size: Vec3 },
    Cylinder { radius: f32, height: f32 },
    Sphere { radius: f32 },
    /// Triangle soup, three consecutive vertices per face.
    ConcavePolygon { faces: Vec<Vec3>, backface_collision: bool },
}

impl ColliderShape {
    pub fn from_half_extents(hx: f32, hy: f32, hz: f32) -> Self {
        ColliderShape::Box {
            size: Vec3::new(hx * 2.0, hy * 2.0, hz * 2.0),
        }
    }
}
