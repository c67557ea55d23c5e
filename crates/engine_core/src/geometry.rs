//! Triangle mesh helpers shared by generated and imported geometry.

use glam::Vec3;

/// Area-weighted vertex normals for an indexed triangle list.
///
/// Each face contributes its unnormalized cross product, so larger triangles weigh
/// more. Vertices no triangle touches get +Y. Triangles with an out-of-range index
/// are skipped.
pub fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(pa), Some(pb), Some(pc)) = (positions.get(a), positions.get(b), positions.get(c)) else {
            continue;
        };
        let pa = Vec3::from_array(*pa);
        let face = (Vec3::from_array(*pb) - pa).cross(Vec3::from_array(*pc) - pa);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }
    accum
        .into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            (if n == Vec3::ZERO { Vec3::Y } else { n }).to_array()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_quad_points_up() {
        let positions = [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 0.0, 0.0]];
        let normals = smooth_normals(&positions, &[0, 1, 2, 0, 2, 3]);
        assert_eq!(normals, vec![[0.0, 1.0, 0.0]; 4]);
    }

    #[test]
    fn shared_edge_is_weighted_by_area() {
        // A big floor triangle and a small wall triangle share vertices 0 and 1.
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, -10.0],
            [0.0, 0.1, 0.0],
        ];
        let normals = smooth_normals(&positions, &[0, 1, 2, 0, 3, 1]);
        let shared = Vec3::from_array(normals[0]);
        assert!(shared.y > 0.99, "floor should dominate: {shared:?}");
        assert!(shared.z < 0.0);
    }

    #[test]
    fn unused_and_degenerate_vertices_default_to_up() {
        let positions = [[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [5.0, 5.0, 5.0]];
        let normals = smooth_normals(&positions, &[0, 1, 2, 0, 1, 9]);
        assert_eq!(normals, vec![[0.0, 1.0, 0.0]; 4]);
    }
}
