//! Vertex, instance and uniform layouts shared with the shaders.

use bytemuck::{Pod, Zeroable};
use engine_core::Transform;

/// Most point lights the mesh shader evaluates per fragment.
pub const MAX_POINT_LIGHTS: usize = 8;

/// Standard vertex with position, normal, UV coordinates, and color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    /// Linear RGBA.
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn with_color(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2], color: [f32; 4]) -> Self {
        Self { position, normal, tex_coords, color }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // UV
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // Color
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Instance data for instanced mesh rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Model matrix (4x4)
    pub model: [[f32; 4]; 4],
    /// Color tint
    pub color: [f32; 4],
}

impl InstanceData {
    pub fn new(model: [[f32; 4]; 4], color: [f32; 4]) -> Self {
        Self { model, color }
    }

    pub fn from_transform(transform: &Transform, color: [f32; 4]) -> Self {
        Self::new(transform.to_matrix().to_cols_array_2d(), color)
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // Model matrix columns 0..4
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // Tint
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

impl Default for InstanceData {
    fn default() -> Self {
        Self {
            model: glam::Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// One particle position, streamed per instance into the billboard pipeline.
pub fn particle_position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

/// GPU point light.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightRaw {
    /// xyz = world position, w = cutoff range (0 = infinite).
    pub position_range: [f32; 4],
    /// rgb = color * intensity, w unused.
    pub radiance: [f32; 4],
}

/// Scene lighting uniform (group 0, binding 1).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightsUniform {
    /// rgb = ambient color * intensity.
    pub ambient: [f32; 4],
    /// xyz = direction the sunlight travels (normalized).
    pub sun_direction: [f32; 4],
    /// rgb = sun color * intensity.
    pub sun_color: [f32; 4],
    /// rgb = fog color, w = exponential-squared density.
    pub fog: [f32; 4],
    /// x = active point light count.
    pub params: [f32; 4],
    pub points: [PointLightRaw; MAX_POINT_LIGHTS],
}

impl LightsUniform {
    /// Replace the point lights. Anything past [`MAX_POINT_LIGHTS`] is dropped.
    pub fn set_points(&mut self, points: impl IntoIterator<Item = PointLightRaw>) {
        self.points = [PointLightRaw::default(); MAX_POINT_LIGHTS];
        let mut count = 0;
        for (slot, light) in self.points.iter_mut().zip(points) {
            *slot = light;
            count += 1;
        }
        self.params[0] = count as f32;
    }

    pub fn point_count(&self) -> usize {
        self.params[0] as usize
    }
}

impl Default for LightsUniform {
    fn default() -> Self {
        Self {
            ambient: [0.2, 0.2, 0.25, 0.0],
            sun_direction: [-0.4, -1.0, -0.3, 0.0],
            sun_color: [0.8, 0.75, 0.7, 0.0],
            fog: [0.0, 0.0, 0.0, 0.0],
            params: [0.0; 4],
            points: [PointLightRaw::default(); MAX_POINT_LIGHTS],
        }
    }
}

/// Per-group particle appearance (group 1, binding 0 of the particle pipeline).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleStyleUniform {
    /// Linear RGB plus opacity.
    pub color: [f32; 4],
    /// x = world-space point size.
    pub params: [f32; 4],
}

impl ParticleStyleUniform {
    pub fn new(color: [f32; 4], size: f32) -> Self {
        Self {
            color,
            params: [size, 0.0, 0.0, 0.0],
        }
    }
}
