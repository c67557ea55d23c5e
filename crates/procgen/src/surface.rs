//! CPU mesh output shared by the generators.

use bytemuck::{Pod, Zeroable};
use engine_core::smooth_normals;
use glam::Vec3;

/// Derive a deterministic u32 noise seed from a scene seed and an offset.
/// Same (seed, offset) always gives the same result.
#[inline]
pub(crate) fn deterministic_noise_seed(seed: u64, offset: u64) -> u32 {
    ((seed.wrapping_add(offset))
        .wrapping_mul(0x9e3779b97f4a7c15_u64)
        .wrapping_add(offset.wrapping_mul(0x6c078965_u64))
        >> 32) as u32
}

/// Vertex for generated meshes. Same layout as the renderer's vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Linear RGBA.
    pub color: [f32; 4],
}

/// Generated triangle mesh (counter-clockwise winding, `u32` indices).
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    pub vertices: Vec<SurfaceVertex>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Replace every normal with the area-weighted average of adjacent face normals.
    pub fn recompute_normals(&mut self) {
        let positions: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.position).collect();
        for (vertex, normal) in self.vertices.iter_mut().zip(smooth_normals(&positions, &self.indices)) {
            vertex.normal = normal;
        }
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from_array(v.position));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recompute_normals_of_flat_quad_points_up() {
        let v = |x: f32, z: f32| SurfaceVertex {
            position: [x, 0.0, z],
            normal: [0.0; 3],
            uv: [0.0; 2],
            color: [1.0; 4],
        };
        let mut mesh = SurfaceMesh {
            vertices: vec![v(0.0, 0.0), v(0.0, 1.0), v(1.0, 1.0), v(1.0, 0.0)],
            indices: vec![0, 1, 2, 0, 2, 3],
        };
        mesh.recompute_normals();
        for vertex in &mesh.vertices {
            assert!((Vec3::from_array(vertex.normal) - Vec3::Y).length() < 1e-6);
        }
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn noise_seed_is_deterministic() {
        assert_eq!(deterministic_noise_seed(42, 7), deterministic_noise_seed(42, 7));
        assert_ne!(deterministic_noise_seed(42, 7), deterministic_noise_seed(42, 8));
    }
}
