//! CPU mesh data and its GPU upload.

use crate::vertex::Vertex;
use engine_core::smooth_normals;
use glam::Vec3;
use wgpu::util::DeviceExt;

/// A GPU mesh with vertex and index buffers.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    /// Create a mesh from vertex and index data.
    pub fn new(device: &wgpu::Device, label: &str, vertices: &[Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }
}

/// Triangle list on the CPU, ready to upload.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn upload(&self, device: &wgpu::Device, label: &str) -> Mesh {
        Mesh::new(device, label, &self.vertices, &self.indices)
    }

    /// Smooth normals from face normals, for sources that ship none.
    pub fn compute_normals(&mut self) {
        let positions: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.position).collect();
        for (vertex, normal) in self.vertices.iter_mut().zip(smooth_normals(&positions, &self.indices)) {
            vertex.normal = normal;
        }
    }

    /// Axis-aligned bounds, or `None` when there are no vertices.
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
    fn compute_normals_for_a_wall_faces_plus_z() {
        let mut data = MeshData::new(
            vec![
                Vertex::new([0.0, 0.0, 0.0], [0.0; 3], [0.0; 2]),
                Vertex::new([1.0, 0.0, 0.0], [0.0; 3], [0.0; 2]),
                Vertex::new([0.0, 1.0, 0.0], [0.0; 3], [0.0; 2]),
            ],
            vec![0, 1, 2],
        );
        data.compute_normals();
        assert!(data.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
        assert_eq!(data.triangle_count(), 1);
    }

    #[test]
    fn bounds_of_empty_mesh_is_none() {
        assert!(MeshData::default().bounds().is_none());
        assert!(MeshData::default().is_empty());
    }
}
