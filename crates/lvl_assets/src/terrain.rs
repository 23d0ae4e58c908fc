//! Terrain geometry: vertex welding, normal reconstruction, blend UVs and
//! blend-map repacking.
//!
//! Normals shipped with terrain data are not usable, so they are always
//! rebuilt from the triangles. Terrain patches duplicate their border
//! vertices, so the index buffer is welded before normals are computed.

use glam::{Vec2, Vec3};
use log::{debug, warn};
use lvl_core::{
    material::{SurfaceMaterial, TextureData, TextureFormat},
    mesh::GeometrySurface,
};

use crate::{
    error::GeometryError,
    source::{BlendMapDef, TerrainDef},
};

#[derive(Debug, Clone, Copy)]
pub struct TerrainOptions {
    pub weld_vertices: bool,
    pub weld_distance_sq: f32,
}

impl Default for TerrainOptions {
    fn default() -> Self {
        Self {
            weld_vertices: true,
            weld_distance_sq: 0.01,
        }
    }
}

/// Rewrites every later index entry whose vertex lies within
/// `distance_sq` of an earlier entry's vertex to the earlier index.
///
/// Entries pointing outside `positions` are left alone.
pub fn weld_indices(positions: &[Vec3], indices: &mut [u32], distance_sq: f32) {
    let mut visited = vec![false; indices.len()];
    for i in 0..indices.len() {
        if visited[i] {
            continue;
        }
        let Some(&a) = positions.get(indices[i] as usize) else {
            continue;
        };
        for j in i + 1..indices.len() {
            let Some(&b) = positions.get(indices[j] as usize) else {
                continue;
            };
            if a.distance_squared(b) < distance_sq {
                indices[j] = indices[i];
                visited[j] = true;
            }
        }
    }
}

/// Maps each vertex's XZ position into the XZ bounding box, scaled to [0, 1].
pub fn blend_uvs(positions: &[Vec3]) -> Vec<Vec2> {
    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);
    for p in positions {
        let xz = Vec2::new(p.x, p.z);
        min = min.min(xz);
        max = max.max(xz);
    }
    let extent = max - min;

    let axis = |value: f32, lo: f32, width: f32| {
        if width > 0.0 { (value - lo) / width } else { 0.0 }
    };
    positions
        .iter()
        .map(|p| Vec2::new(axis(p.x, min.x, extent.x), axis(p.z, min.y, extent.y)))
        .collect()
}

/// Builds the terrain surface: welded, reversed triangles with recomputed
/// normals and blend UVs in the second UV channel. The material is left for
/// the caller to assign.
pub fn build_terrain_surface(terrain: &TerrainDef, options: &TerrainOptions) -> GeometrySurface {
    let positions = &terrain.positions;
    let vertex_count = positions.len();

    let mut source = terrain.indices.clone();
    if options.weld_vertices {
        debug!("Welding {} terrain indices of {}", source.len(), terrain.name);
        weld_indices(positions, &mut source, options.weld_distance_sq);
    }

    let mut normals = vec![Vec3::ZERO; vertex_count];
    let mut indices = Vec::with_capacity(source.len());
    let mut skipped = 0usize;
    for tri in source.chunks_exact(3) {
        // Terrain winding is opposite to what the renderer expects
        let (v0, v1, v2) = (tri[2] as usize, tri[1] as usize, tri[0] as usize);
        if v0 >= vertex_count || v1 >= vertex_count || v2 >= vertex_count {
            skipped += 1;
            continue;
        }
        indices.extend_from_slice(&[tri[2], tri[1], tri[0]]);

        let face = (positions[v1] - positions[v0])
            .cross(positions[v2] - positions[v0])
            .normalize_or_zero();
        normals[v0] -= face;
        normals[v1] -= face;
        normals[v2] -= face;
    }
    if skipped > 0 {
        warn!("Skipped {skipped} terrain triangles of {} with out of range indices", terrain.name);
    }
    for n in &mut normals {
        *n = n.normalize_or_zero();
    }

    let mut uvs = terrain.uvs.clone();
    if uvs.len() != vertex_count {
        warn!(
            "Terrain {} has {} uvs for {} vertices, padding",
            terrain.name,
            uvs.len(),
            vertex_count
        );
        uvs.resize(vertex_count, Vec2::ZERO);
    }

    GeometrySurface {
        positions: positions.clone(),
        normals,
        uvs,
        uv2: Some(blend_uvs(positions)),
        indices,
        material: SurfaceMaterial::None,
    }
}

/// Number of RGBA images needed to hold `layers` weights per pixel.
pub fn blend_map_count(layers: u32) -> usize {
    (layers as usize).div_ceil(4)
}

/// Repacks interleaved per-pixel layer weights into RGBA images, four layers
/// per image. Image `m` is named `<prefix>_blend_map_<m>`.
pub fn repack_blend_map(
    blend: &BlendMapDef,
    prefix: &str,
) -> Result<Vec<TextureData>, GeometryError> {
    let layers = blend.layers as usize;
    let pixels = blend.dim as usize * blend.dim as usize;
    let expected = pixels * layers;
    if blend.weights.len() < expected {
        return Err(GeometryError::BlendMapTooShort {
            expected,
            actual: blend.weights.len(),
        });
    }

    let maps = (0..blend_map_count(blend.layers))
        .map(|m| {
            let mut rgba = vec![0u8; pixels * 4];
            for p in 0..pixels {
                for c in 0..4 {
                    let layer = 4 * m + c;
                    if layer < layers {
                        rgba[p * 4 + c] = blend.weights[layers * p + layer];
                    }
                }
            }
            TextureData {
                name: format!("{prefix}_blend_map_{m}"),
                pixels: rgba,
                width: blend.dim,
                height: blend.dim,
                format: TextureFormat::Rgba8Unorm,
            }
        })
        .collect();
    Ok(maps)
}
