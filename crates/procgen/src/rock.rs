//! Stones: UV spheres squashed vertically and pushed in and out by 3D noise.

use glam::Vec3;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::surface::{deterministic_noise_seed, SurfaceMesh, SurfaceVertex};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RockConfig {
    /// Unit radius before scatter scaling.
    pub radius: f32,
    pub segments: u32,
    pub rings: u32,
    /// Fraction of the radius noise may add or remove.
    pub roughness: f32,
    /// Vertical squash (1 = round, <1 = flat pebble).
    pub flatten: f32,
    /// Linear RGB base color.
    pub color: [f32; 3],
}

impl Default for RockConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            segments: 14,
            rings: 9,
            roughness: 0.28,
            flatten: 0.65,
            color: [0.19, 0.18, 0.17],
        }
    }
}

/// Generate one stone mesh. Different seeds give different silhouettes.
pub fn generate_rock(config: &RockConfig, seed: u64) -> SurfaceMesh {
    let perlin = Perlin::new(deterministic_noise_seed(seed, 17));
    let segments = config.segments.max(3);
    let rings = config.rings.max(2);

    let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
    for ring in 0..=rings {
        let phi = std::f32::consts::PI * ring as f32 / rings as f32;
        for segment in 0..=segments {
            let theta = std::f32::consts::TAU * segment as f32 / segments as f32;
            let dir = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());

            // Sample in direction space so the seam column gets the same offset.
            let n = perlin.get([dir.x as f64 * 1.7, dir.y as f64 * 1.7, dir.z as f64 * 1.7]) as f32;
            let radius = config.radius * (1.0 + n * config.roughness);
            let position = Vec3::new(dir.x * radius, dir.y * radius * config.flatten, dir.z * radius);

            let shade = 0.85 + 0.3 * (n * 0.5 + 0.5);
            let [r, g, b] = config.color.map(|c| (c * shade).clamp(0.0, 1.0));
            vertices.push(SurfaceVertex {
                position: position.to_array(),
                normal: dir.to_array(),
                uv: [segment as f32 / segments as f32, ring as f32 / rings as f32],
                color: [r, g, b, 1.0],
            });
        }
    }

    let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
    for ring in 0..rings {
        for segment in 0..segments {
            let current = ring * (segments + 1) + segment;
            let next = current + segments + 1;
            indices.extend_from_slice(&[current, current + 1, next, current + 1, next + 1, next]);
        }
    }

    let mut mesh = SurfaceMesh { vertices, indices };
    mesh.recompute_normals();
    mesh
}

/// A handful of distinct stone meshes derived from one seed.
pub fn generate_rock_set(config: &RockConfig, seed: u64, variants: usize) -> Vec<SurfaceMesh> {
    (0..variants as u64)
        .map(|i| generate_rock(config, seed.wrapping_add(i.wrapping_mul(7919))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rock_is_well_formed() {
        let config = RockConfig::default();
        let mesh = generate_rock(&config, 5);
        let expected_vertices = ((config.segments + 1) * (config.rings + 1)) as usize;
        assert_eq!(mesh.vertices.len(), expected_vertices);
        assert_eq!(mesh.indices.len(), (config.segments * config.rings * 6) as usize);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < expected_vertices));
        for v in &mesh.vertices {
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn rock_stays_within_roughness_envelope() {
        let config = RockConfig::default();
        let mesh = generate_rock(&config, 11);
        let max_r = config.radius * (1.0 + config.roughness) * 1.1;
        let (lo, hi) = mesh.bounds().unwrap();
        assert!(hi.x <= max_r && lo.x >= -max_r);
        assert!(hi.y <= max_r * config.flatten && lo.y >= -max_r * config.flatten);
    }

    #[test]
    fn normals_face_outward() {
        let mesh = generate_rock(&RockConfig::default(), 2);
        let outward = mesh
            .vertices
            .iter()
            .filter(|v| Vec3::from_array(v.normal).dot(Vec3::from_array(v.position)) > 0.0)
            .count();
        assert!(outward as f32 / mesh.vertices.len() as f32 > 0.9);
    }

    #[test]
    fn variants_differ() {
        let set = generate_rock_set(&RockConfig::default(), 1, 3);
        assert_eq!(set.len(), 3);
        assert_ne!(set[0].vertices[20].position, set[1].vertices[20].position);
    }
}
