//! Random placement of stones in an annulus around the centerpiece.

use engine_core::Transform;
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ground::Ground;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterConfig {
    pub count: usize,
    /// Keep-out radius around the pivot.
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Fraction of its height a stone is sunk into the sand.
    pub sink: f32,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            count: 60,
            inner_radius: 4.0,
            outer_radius: 60.0,
            min_scale: 0.25,
            max_scale: 1.4,
            sink: 0.3,
        }
    }
}

/// Where one stone goes and which mesh variant it uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub transform: Transform,
    pub variant: usize,
}

/// Scatter `config.count` stones around `pivot`, resting on `ground`.
pub fn scatter_stones<R: Rng + ?Sized>(
    config: &ScatterConfig,
    pivot: Vec3,
    ground: &Ground,
    variants: usize,
    rng: &mut R,
) -> Vec<Placement> {
    let variants = variants.max(1);
    let inner = config.inner_radius.min(config.outer_radius);
    (0..config.count)
        .map(|_| {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let distance = if config.outer_radius > inner {
                rng.gen_range(inner..config.outer_radius)
            } else {
                inner
            };
            let scale = if config.max_scale > config.min_scale {
                rng.gen_range(config.min_scale..config.max_scale)
            } else {
                config.min_scale
            };
            let x = pivot.x + angle.cos() * distance;
            let z = pivot.z + angle.sin() * distance;
            let y = ground.height_at(x, z) - scale * config.sink;
            let yaw = rng.gen_range(0.0..std::f32::consts::TAU);
            Placement {
                transform: Transform::from_position_yaw_scale(Vec3::new(x, y, z), yaw, scale),
                variant: rng.gen_range(0..variants),
            }
        })
        .collect()
}
