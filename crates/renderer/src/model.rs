//! glTF model import.
//!
//! Node transforms are baked into the vertices and each primitive's base color
//! factor is folded into its vertex colors, so a loaded model draws through the
//! ordinary mesh pipeline with one instance transform.

use std::path::{Path, PathBuf};

use glam::{Mat3, Mat4, Vec3};

use crate::mesh::MeshData;
use crate::vertex::Vertex;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to import glTF '{path}': {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("mesh '{mesh}' has a primitive without positions")]
    MissingPositions { mesh: String },
    #[error("'{0}' contains no triangle geometry")]
    NoGeometry(PathBuf),
}

/// Every triangle primitive of a glTF scene, one [`MeshData`] per primitive.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }

    /// Bounds over all primitives.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.meshes
            .iter()
            .filter_map(MeshData::bounds)
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }
}

/// Load a `.gltf` / `.glb` file (external and embedded buffers both work).
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelData, ModelError> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path).map_err(|source| ModelError::Import {
        path: path.to_path_buf(),
        source,
    })?;

    let mut model = ModelData::default();
    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(&node, Mat4::IDENTITY, &buffers, &mut model)?;
            }
        }
        // Scene-less files: take the meshes as authored.
        None => {
            for mesh in document.meshes() {
                append_mesh(&mesh, Mat4::IDENTITY, &buffers, &mut model)?;
            }
        }
    }

    if model.meshes.is_empty() {
        return Err(ModelError::NoGeometry(path.to_path_buf()));
    }
    log::info!(
        "Loaded '{}': {} primitives, {} vertices, {} triangles",
        path.display(),
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count()
    );
    Ok(model)
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    model: &mut ModelData,
) -> Result<(), ModelError> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        append_mesh(&mesh, world, buffers, model)?;
    }
    for child in node.children() {
        collect_node(&child, world, buffers, model)?;
    }
    Ok(())
}

fn append_mesh(
    mesh: &gltf::Mesh,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
    model: &mut ModelData,
) -> Result<(), ModelError> {
    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    let mesh_name = || mesh.name().unwrap_or("<unnamed>").to_string();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skipping non-triangle primitive in mesh '{}'", mesh_name());
            continue;
        }
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| ModelError::MissingPositions { mesh: mesh_name() })?
            .collect();
        let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(Iterator::collect);
        let uvs: Option<Vec<[f32; 2]>> = reader.read_tex_coords(0).map(|tc| tc.into_f32().collect());
        let colors: Option<Vec<[f32; 4]>> = reader.read_colors(0).map(|c| c.into_rgba_f32().collect());
        let base = primitive.material().pbr_metallic_roughness().base_color_factor();

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let position = world.transform_point3(Vec3::from_array(p));
                let normal = normals
                    .as_ref()
                    .and_then(|n| n.get(i))
                    .map(|&n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero())
                    .unwrap_or(Vec3::ZERO);
                let uv = uvs.as_ref().and_then(|t| t.get(i)).copied().unwrap_or([0.0; 2]);
                let vc = colors.as_ref().and_then(|c| c.get(i)).copied().unwrap_or([1.0; 4]);
                let color = [vc[0] * base[0], vc[1] * base[1], vc[2] * base[2], vc[3] * base[3]];
                Vertex::with_color(position.to_array(), normal.to_array(), uv, color)
            })
            .collect();
        let indices = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let mut data = MeshData::new(vertices, indices);
        if normals.is_none() {
            data.compute_normals();
        }
        if !data.is_empty() {
            model.meshes.push(data);
        }
    }
    Ok(())
}
