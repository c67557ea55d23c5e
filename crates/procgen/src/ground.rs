//! Sandy ground plane with a low noise ripple.

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::surface::{deterministic_noise_seed, SurfaceMesh, SurfaceVertex};

/// Configuration for ground generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundConfig {
    /// Edge length of the square ground in world units.
    pub size: f32,
    /// Number of vertices per side.
    pub resolution: u32,
    /// Peak height of the dune ripple.
    pub ripple_height: f32,
    /// Noise frequency (lower = broader dunes).
    pub ripple_frequency: f64,
    /// Linear RGB sand color.
    pub color: [f32; 3],
    /// How much the noise darkens/lightens the sand (0 = flat color).
    pub color_variation: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            size: 200.0,
            resolution: 129,
            ripple_height: 0.25,
            ripple_frequency: 0.08,
            color: [0.54, 0.45, 0.22],
            color_variation: 0.12,
        }
    }
}

/// Seeded ground surface centered on the origin.
pub struct Ground {
    config: GroundConfig,
    perlin: Perlin,
    tint: Perlin,
}

impl Ground {
    pub fn new(config: GroundConfig, seed: u64) -> Self {
        Self {
            config,
            perlin: Perlin::new(deterministic_noise_seed(seed, 0)),
            tint: Perlin::new(deterministic_noise_seed(seed, 1)),
        }
    }

    pub fn config(&self) -> &GroundConfig {
        &self.config
    }

    /// Surface height at world (x, z). Two octaves so the sand reads as dunes plus
    /// finer ripples.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let f = self.config.ripple_frequency;
        let (x, z) = (x as f64, z as f64);
        let broad = self.perlin.get([x * f, z * f]);
        let fine = self.perlin.get([x * f * 4.0 + 31.7, z * f * 4.0 - 12.3]) * 0.25;
        ((broad + fine) / 1.25) as f32 * self.config.ripple_height
    }

    /// Build the ground mesh.
    pub fn mesh(&self) -> SurfaceMesh {
        let res = self.config.resolution.max(2) as usize;
        let size = self.config.size;
        let step = size / (res - 1) as f32;
        let half = size / 2.0;

        let mut vertices = Vec::with_capacity(res * res);
        for iz in 0..res {
            for ix in 0..res {
                let x = ix as f32 * step - half;
                let z = iz as f32 * step - half;
                let y = self.height_at(x, z);
                let shade = 1.0
                    + self.tint.get([x as f64 * 0.05, z as f64 * 0.05]) as f32 * self.config.color_variation;
                let [r, g, b] = self.config.color.map(|c| (c * shade).clamp(0.0, 1.0));
                vertices.push(SurfaceVertex {
                    position: [x, y, z],
                    normal: [0.0, 1.0, 0.0],
                    uv: [ix as f32 / (res - 1) as f32, iz as f32 / (res - 1) as f32],
                    color: [r, g, b, 1.0],
                });
            }
        }

        let mut indices = Vec::with_capacity((res - 1) * (res - 1) * 6);
        for iz in 0..res - 1 {
            for ix in 0..res - 1 {
                let i0 = (iz * res + ix) as u32;
                let i1 = i0 + 1;
                let i2 = i0 + res as u32;
                let i3 = i2 + 1;
                indices.extend_from_slice(&[i0, i2, i3, i0, i3, i1]);
            }
        }

        let mut mesh = SurfaceMesh { vertices, indices };
        mesh.recompute_normals();
        log::debug!(
            "Generated ground: {} vertices, {} triangles",
            mesh.vertices.len(),
            mesh.triangle_count()
        );
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GroundConfig {
        GroundConfig {
            size: 20.0,
            resolution: 11,
            ..Default::default()
        }
    }

    #[test]
    fn mesh_has_expected_topology() {
        let mesh = Ground::new(small(), 1).mesh();
        assert_eq!(mesh.vertices.len(), 121);
        assert_eq!(mesh.triangle_count(), 200);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn ripple_stays_within_height_and_normals_point_up() {
        let config = small();
        let mesh = Ground::new(config, 7).mesh();
        for v in &mesh.vertices {
            assert!(v.position[1].abs() <= config.ripple_height * 1.1);
            assert!(v.normal[1] > 0.9);
        }
        let (lo, hi) = mesh.bounds().unwrap();
        assert!((lo.x + 10.0).abs() < 1e-4 && (hi.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn height_is_seeded() {
        let a = Ground::new(small(), 3);
        let b = Ground::new(small(), 3);
        assert_eq!(a.height_at(4.3, -2.1), b.height_at(4.3, -2.1));
    }
}
