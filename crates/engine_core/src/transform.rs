//! Transform for placing scene nodes (ground, stones, centerpiece).

use glam::{Mat4, Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Position, rotation about +Y, and uniform scale. The common case for props
    /// standing on the ground.
    pub fn from_position_yaw_scale(position: Vec3, yaw: f32, scale: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(yaw),
            scale: Vec3::splat(scale),
        }
    }

    /// Create the model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_applies_scale_then_rotation_then_translation() {
        let t = Transform::from_position_yaw_scale(
            Vec3::new(1.0, 2.0, 3.0),
            std::f32::consts::FRAC_PI_2,
            2.0,
        );
        let p = t.to_matrix().transform_point3(Vec3::X);
        // +X scaled to 2, yawed 90 degrees onto -Z, then translated.
        assert!((p - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5);
    }
}
