//! Orbit-controls camera circling a target point.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Lowest pitch; keeps the eye above the ground plane.
const MIN_PITCH: f32 = 0.02;
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Camera orbiting `target` at `distance`, steered by yaw/pitch.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Point the camera looks at and orbits.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Radians per pixel of mouse drag.
    pub rotate_sensitivity: f32,
    /// Fraction of the distance removed per scroll line.
    pub zoom_sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Idle spin in radians per second (0 disables).
    pub auto_rotate_speed: f32,
    distance: f32,
    /// Rotation about +Y in radians.
    yaw: f32,
    /// Elevation above the horizon in radians.
    pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
            rotate_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
            min_distance: 3.0,
            max_distance: 120.0,
            auto_rotate_speed: 0.0,
            distance: 30.0,
            yaw: 0.0,
            pitch: 0.35,
        }
    }
}

impl OrbitCamera {
    /// Create a camera looking at `target` from `distance` away.
    pub fn new(target: Vec3, distance: f32, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            target,
            ..Default::default()
        };
        camera.set_distance(distance);
        camera.set_yaw_pitch(yaw, pitch);
        camera
    }

    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Mouse drag in pixels. Dragging right spins the scene right.
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        let yaw = self.yaw - delta_x * self.rotate_sensitivity;
        let pitch = self.pitch + delta_y * self.rotate_sensitivity;
        self.set_yaw_pitch(yaw, pitch);
    }

    /// Scroll in lines; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - lines * self.zoom_sensitivity).max(0.1);
        self.set_distance(self.distance * factor);
    }

    /// Per-frame idle motion.
    pub fn update(&mut self, dt: f32) {
        if self.auto_rotate_speed != 0.0 {
            self.set_yaw_pitch(self.yaw + self.auto_rotate_speed * dt, self.pitch);
        }
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(self.min_distance, self.max_distance);
    }

    /// Set yaw and pitch directly (in radians). Pitch is clamped.
    pub fn set_yaw_pitch(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw.rem_euclid(std::f32::consts::TAU);
        self.pitch = pitch.clamp(MIN_PITCH, MAX_PITCH);
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Eye position in world space.
    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Camera uniform data for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub position: [f32; 4], // w unused, padding
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 4],
        }
    }

    pub fn update(&mut self, camera: &OrbitCamera) {
        self.view = camera.view_matrix().to_cols_array_2d();
        self.proj = camera.projection_matrix().to_cols_array_2d();
        self.view_proj = camera.view_projection_matrix().to_cols_array_2d();
        let pos = camera.position();
        self.position = [pos.x, pos.y, pos.z, 1.0];
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}
