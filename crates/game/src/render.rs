//! GPU copies of the scene and the per-frame draw.

use anyhow::Result;
use procgen::SurfaceMesh;
use renderer::{InstanceData, Mesh, MeshBatch, ParticleBuffers, ParticleStyleUniform, Renderer, Vertex};

use crate::state::{Centerpiece, SceneState};
use crate::GameState;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

fn upload_surface(renderer: &Renderer, label: &str, mesh: &SurfaceMesh) -> Mesh {
    let vertices: &[Vertex] = bytemuck::cast_slice(&mesh.vertices);
    Mesh::new(renderer.device(), label, vertices, &mesh.indices)
}

/// Whether a particle buffer of `capacity` points can hold a group of `len`.
fn fits(capacity: u32, len: usize) -> bool {
    len <= capacity as usize
}

/// Meshes, instance lists and particle buffers uploaded from a [`SceneState`].
pub struct SceneMeshes {
    ground: Mesh,
    ground_instances: Vec<InstanceData>,
    rocks: Vec<Mesh>,
    rock_instances: Vec<Vec<InstanceData>>,
    centerpiece: Vec<Mesh>,
    centerpiece_instances: Vec<InstanceData>,
    /// One per particle group, same order as `SceneEffects::groups`.
    particles: Vec<ParticleBuffers>,
}

impl SceneMeshes {
    pub fn new(renderer: &Renderer, scene: &SceneState) -> Self {
        let ground = upload_surface(renderer, "Ground", &scene.ground_mesh);
        let rocks: Vec<Mesh> = scene
            .rock_meshes
            .iter()
            .enumerate()
            .map(|(i, mesh)| upload_surface(renderer, &format!("Rock {i}"), mesh))
            .collect();

        let mut rock_instances = vec![Vec::new(); rocks.len()];
        for stone in &scene.stones {
            if let Some(list) = rock_instances.get_mut(stone.variant) {
                list.push(InstanceData::from_transform(&stone.transform, WHITE));
            }
        }

        let mut meshes = Self {
            ground,
            ground_instances: vec![InstanceData::default()],
            rocks,
            rock_instances,
            centerpiece: Vec::new(),
            centerpiece_instances: Vec::new(),
            particles: Vec::new(),
        };
        meshes.rebuild_particles(renderer, scene);
        meshes
    }

    /// Match particle buffers to the scene's current groups (after a reseed). A buffer
    /// big enough for its group is kept and only gets the new style.
    pub fn rebuild_particles(&mut self, renderer: &Renderer, scene: &SceneState) {
        let mut old = std::mem::take(&mut self.particles).into_iter();
        self.particles = scene
            .effects
            .groups
            .iter()
            .map(|group| {
                let style = group.style();
                let uniform = ParticleStyleUniform::new(style.linear_rgba(), style.size);
                match old.next() {
                    Some(buffers) if fits(buffers.capacity(), group.len()) => {
                        renderer.update_particle_style(&buffers, uniform);
                        buffers
                    }
                    _ => renderer.create_particle_buffers(group.name(), group.len(), uniform),
                }
            })
            .collect();
    }

    pub fn attach_centerpiece(&mut self, renderer: &Renderer, centerpiece: &Centerpiece) {
        self.centerpiece = centerpiece
            .model
            .meshes
            .iter()
            .enumerate()
            .map(|(i, data)| data.upload(renderer.device(), &format!("Centerpiece {i}")))
            .collect();
        self.centerpiece_instances = vec![InstanceData::from_transform(&centerpiece.transform, WHITE)];
    }

    fn batches(&self) -> Vec<MeshBatch<'_>> {
        let mut batches = vec![MeshBatch {
            mesh: &self.ground,
            instances: &self.ground_instances,
        }];
        batches.extend(self.rocks.iter().zip(&self.rock_instances).map(|(mesh, instances)| MeshBatch {
            mesh,
            instances,
        }));
        batches.extend(self.centerpiece.iter().map(|mesh| MeshBatch {
            mesh,
            instances: &self.centerpiece_instances,
        }));
        batches
    }
}

/// Render one frame.
pub fn run(state: &mut GameState) -> Result<()> {
    let (output, mut encoder) = match state.renderer.begin_frame() {
        Ok(frame) => frame,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            log::warn!("Surface lost or outdated, reconfiguring");
            state.renderer.reconfigure();
            return Ok(());
        }
        Err(wgpu::SurfaceError::OutOfMemory) => {
            state.running = false;
            anyhow::bail!("GPU out of memory");
        }
        Err(e) => {
            log::warn!("Skipping frame: {}", e);
            return Ok(());
        }
    };

    // Re-upload only groups that moved since the last upload.
    for (group, buffers) in state.scene.effects.groups.iter_mut().zip(&mut state.meshes.particles) {
        if group.needs_upload() || buffers.count() == 0 {
            state.renderer.upload_particles(buffers, group.positions());
            group.mark_uploaded();
        }
    }

    state.renderer.update_camera(&state.camera);
    state.renderer.update_lights(&state.scene.lights(&state.config.lighting));

    let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
    let batches = state.meshes.batches();
    let particles: Vec<&ParticleBuffers> = state.meshes.particles.iter().collect();
    state.renderer.render_scene(&mut encoder, &view, &batches, &particles);
    state.renderer.end_frame(output, encoder);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_buffers_are_reused_only_when_large_enough() {
        assert!(fits(7500, 6000));
        assert!(fits(1500, 1500));
        assert!(!fits(1500, 1501));
        assert!(fits(1, 0));
    }
}
