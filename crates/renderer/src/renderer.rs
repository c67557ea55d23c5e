//! Main renderer managing wgpu state and rendering.

use crate::{
    camera::{CameraUniform, OrbitCamera},
    mesh::Mesh,
    pipeline::{
        create_mesh_pipeline, create_particle_pipeline, create_particle_style_bind_group_layout,
        create_scene_bind_group_layout,
    },
    texture::Texture,
    vertex::{InstanceData, LightsUniform, ParticleStyleUniform},
};
use anyhow::Result;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Capacity of the shared per-frame instance buffer.
const MAX_INSTANCES: u32 = 4096;

/// One mesh drawn once per instance.
pub struct MeshBatch<'a> {
    pub mesh: &'a Mesh,
    pub instances: &'a [InstanceData],
}

/// GPU side of one particle group: a position buffer plus its style.
pub struct ParticleBuffers {
    position_buffer: wgpu::Buffer,
    style_buffer: wgpu::Buffer,
    style_bind_group: wgpu::BindGroup,
    capacity: u32,
    count: u32,
}

impl ParticleBuffers {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

/// The main renderer.
pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,

    depth_texture: Texture,

    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    style_bind_group_layout: wgpu::BindGroupLayout,

    mesh_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,

    instance_buffer: wgpu::Buffer,
    clear_color: wgpu::Color,
}

impl Renderer {
    /// Create a new renderer for the given window.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface reports no supported formats"))?;

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights Buffer"),
            contents: bytemuck::cast_slice(&[LightsUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_bind_group_layout = create_scene_bind_group_layout(&device);
        let style_bind_group_layout = create_particle_style_bind_group_layout(&device);

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        });

        let mesh_pipeline = create_mesh_pipeline(&device, &config, &scene_bind_group_layout);
        let particle_pipeline =
            create_particle_pipeline(&device, &config, &scene_bind_group_layout, &style_bind_group_layout);

        let depth_texture = Texture::create_depth_texture(&device, config.width, config.height, "Depth Texture");

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (std::mem::size_of::<InstanceData>() * MAX_INSTANCES as usize) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::info!(
            "Renderer ready: {}x{} {:?} ({:?})",
            config.width,
            config.height,
            config.format,
            config.present_mode
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth_texture,
            camera_uniform,
            camera_buffer,
            lights_buffer,
            scene_bind_group,
            style_bind_group_layout,
            mesh_pipeline,
            particle_pipeline,
            instance_buffer,
            clear_color: wgpu::Color::BLACK,
        })
    }

    /// Handle window resize.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Texture::create_depth_texture(
                &self.device,
                self.config.width,
                self.config.height,
                "Depth Texture",
            );
        }
    }

    /// Reconfigure the surface at its current size (after `Lost` / `Outdated`).
    pub fn reconfigure(&mut self) {
        self.resize(self.size);
    }

    pub fn update_camera(&mut self, camera: &OrbitCamera) {
        self.camera_uniform.update(camera);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
    }

    pub fn update_lights(&mut self, lights: &LightsUniform) {
        self.queue.write_buffer(&self.lights_buffer, 0, bytemuck::cast_slice(&[*lights]));
    }

    /// Linear RGB used to clear the frame (usually the fog color).
    pub fn set_clear_color(&mut self, rgb: [f32; 3]) {
        self.clear_color = wgpu::Color {
            r: rgb[0] as f64,
            g: rgb[1] as f64,
            b: rgb[2] as f64,
            a: 1.0,
        };
    }

    /// Allocate buffers for a particle group of up to `capacity` points.
    pub fn create_particle_buffers(&self, label: &str, capacity: usize, style: ParticleStyleUniform) -> ParticleBuffers {
        let capacity = capacity.max(1) as u32;
        let position_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Particle Positions")),
            size: (std::mem::size_of::<[f32; 3]>() * capacity as usize) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let style_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Particle Style")),
            contents: bytemuck::cast_slice(&[style]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let style_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Particle Style Bind Group")),
            layout: &self.style_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: style_buffer.as_entire_binding(),
            }],
        });
        ParticleBuffers {
            position_buffer,
            style_buffer,
            style_bind_group,
            capacity,
            count: 0,
        }
    }

    /// Copy positions into the group's buffer. Points past its capacity are not drawn.
    pub fn upload_particles(&self, buffers: &mut ParticleBuffers, positions: &[[f32; 3]]) {
        let count = positions.len().min(buffers.capacity as usize);
        if count > 0 {
            self.queue
                .write_buffer(&buffers.position_buffer, 0, bytemuck::cast_slice(&positions[..count]));
        }
        buffers.count = count as u32;
    }

    pub fn update_particle_style(&self, buffers: &ParticleBuffers, style: ParticleStyleUniform) {
        self.queue.write_buffer(&buffers.style_buffer, 0, bytemuck::cast_slice(&[style]));
    }

    /// Begin a new frame, returns the surface texture and a command encoder.
    pub fn begin_frame(&mut self) -> Result<(wgpu::SurfaceTexture, wgpu::CommandEncoder), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        Ok((output, encoder))
    }

    /// Draw opaque meshes, then particle groups, in a single cleared pass.
    pub fn render_scene(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        batches: &[MeshBatch],
        particles: &[&ParticleBuffers],
    ) {
        // Pack every batch's instances into the shared buffer before recording.
        let mut ranges = Vec::with_capacity(batches.len());
        let mut offset = 0u32;
        for batch in batches {
            let remaining = MAX_INSTANCES.saturating_sub(offset) as usize;
            let count = batch.instances.len().min(remaining);
            if count < batch.instances.len() {
                log::warn!("Instance buffer full, dropping {} instances", batch.instances.len() - count);
            }
            if count > 0 {
                let byte_offset = (offset as usize * std::mem::size_of::<InstanceData>()) as u64;
                self.queue.write_buffer(
                    &self.instance_buffer,
                    byte_offset,
                    bytemuck::cast_slice(&batch.instances[..count]),
                );
            }
            ranges.push(offset..offset + count as u32);
            offset += count as u32;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.mesh_pipeline);
        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        for (batch, range) in batches.iter().zip(ranges) {
            if range.is_empty() {
                continue;
            }
            render_pass.set_vertex_buffer(0, batch.mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(batch.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..batch.mesh.num_indices, 0, range);
        }

        render_pass.set_pipeline(&self.particle_pipeline);
        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
        for group in particles.iter().filter(|g| g.count > 0) {
            render_pass.set_bind_group(1, &group.style_bind_group, &[]);
            render_pass.set_vertex_buffer(0, group.position_buffer.slice(..));
            render_pass.draw(0..6, 0..group.count);
        }
    }

    /// End frame and present.
    pub fn end_frame(&self, output: wgpu::SurfaceTexture, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    /// Get window dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Access the device for mesh creation.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}
