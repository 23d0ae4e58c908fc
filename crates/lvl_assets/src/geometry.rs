use lvl_core::{material::SurfaceMaterial, mesh::GeometrySurface};

use crate::{error::GeometryError, source::{SegmentDef, Topology}};

/// Rebuilds a triangle-list index buffer from `indices` laid out as `topology`.
pub fn triangulate(topology: Topology, indices: &[u32]) -> Result<Vec<u32>, GeometryError> {
    match topology {
        Topology::TriangleList => Ok(indices.to_vec()),
        Topology::TriangleStrip => {
            let mut out = Vec::with_capacity(indices.len().saturating_sub(2) * 3);
            for i in 0..indices.len().saturating_sub(2) {
                // Every other triangle flips winding to keep faces consistent
                if i % 2 == 1 {
                    out.extend_from_slice(&[indices[i], indices[i + 1], indices[i + 2]]);
                } else {
                    out.extend_from_slice(&[indices[i], indices[i + 2], indices[i + 1]]);
                }
            }
            Ok(out)
        }
        Topology::TriangleFan => {
            if indices.len() < 3 {
                return Err(GeometryError::DegenerateFan(indices.len()));
            }
            let hub = indices[0];
            let mut out = Vec::new();
            // Steps by two: an odd vertex left after the hub is dropped
            let mut i = 1;
            while i < indices.len() - 1 {
                out.extend_from_slice(&[hub, indices[i], indices[i + 1]]);
                i += 2;
            }
            Ok(out)
        }
        other => Err(GeometryError::UnsupportedTopology(other)),
    }
}

fn check_range(indices: &[u32], vertex_count: usize) -> Result<(), GeometryError> {
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(GeometryError::IndexOutOfRange { index, vertex_count }),
        None => Ok(()),
    }
}

/// Converts one model segment into a triangle-list surface without a material.
pub fn build_segment_surface(segment: &SegmentDef) -> Result<GeometrySurface, GeometryError> {
    let vertices = segment.positions.len();
    if vertices != segment.normals.len() || vertices != segment.uvs.len() {
        return Err(GeometryError::MismatchedBuffers {
            vertices,
            normals: segment.normals.len(),
            uvs: segment.uvs.len(),
        });
    }

    let indices = triangulate(segment.topology, &segment.indices)?;
    check_range(&indices, vertices)?;

    Ok(GeometrySurface {
        positions: segment.positions.clone(),
        normals: segment.normals.clone(),
        uvs: segment.uvs.clone(),
        uv2: None,
        indices,
        material: SurfaceMaterial::None,
    })
}
