use glam::{Vec2, Vec3};
use serde::Serialize;
use thiserror::Error;

use crate::material::SurfaceMaterial;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface has {positions} positions, {normals} normals and {uvs} uvs")]
    AttributeCountMismatch {
        positions: usize,
        normals: usize,
        uvs: usize,
    },
    #[error("surface blend uv count {uv2} does not match vertex count {positions}")]
    BlendUvCountMismatch { positions: usize, uv2: usize },
    #[error("index count {0} is not a multiple of 3")]
    NotTriangleList(usize),
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// One renderable chunk. Always triangle-list topology.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GeometrySurface {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub uv2: Option<Vec<Vec2>>,
    pub indices: Vec<u32>,
    pub material: SurfaceMaterial,
}

impl GeometrySurface {
    pub fn validate(&self) -> Result<(), SurfaceError> {
        let positions = self.positions.len();
        if positions != self.normals.len() || positions != self.uvs.len() {
            return Err(SurfaceError::AttributeCountMismatch {
                positions,
                normals: self.normals.len(),
                uvs: self.uvs.len(),
            });
        }
        if let Some(uv2) = &self.uv2 {
            if uv2.len() != positions {
                return Err(SurfaceError::BlendUvCountMismatch {
                    positions,
                    uv2: uv2.len(),
                });
            }
        }
        if self.indices.len() % 3 != 0 {
            return Err(SurfaceError::NotTriangleList(self.indices.len()));
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= positions) {
            return Err(SurfaceError::IndexOutOfRange {
                index,
                vertex_count: positions,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Mesh {
    pub surfaces: Vec<GeometrySurface>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}
