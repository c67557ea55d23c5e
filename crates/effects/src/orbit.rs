//! Orbiting particle groups.
//!
//! Every particle circles a fixed pivot in the horizontal plane. The update is a
//! pure rotation: horizontal distance to the pivot and height never change, only
//! the angle advances.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::srgb_hex_to_linear;
use crate::range::FloatRange;

/// Rotate `position` about the vertical axis through `pivot` by `angle_step` radians.
///
/// A position exactly on the pivot axis has zero radius and stays where it is.
pub fn orbit_step(position: Vec3, pivot: Vec3, angle_step: f32) -> Vec3 {
    let dx = position.x - pivot.x;
    let dz = position.z - pivot.z;
    let angle = dz.atan2(dx) + angle_step;
    let distance = (dx * dx + dz * dz).sqrt();
    Vec3::new(
        pivot.x + angle.cos() * distance,
        position.y,
        pivot.z + angle.sin() * distance,
    )
}

/// How far a particle's angle advances per update.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum OrbitTiming {
    /// One `angular_velocity` increment per rendered frame, whatever the frame rate.
    #[default]
    PerFrame,
    /// `angular_velocity` is the per-frame step at `reference_fps`; the actual step is
    /// scaled by the frame delta so speed is independent of frame rate.
    RealTime { reference_fps: f32 },
}

impl OrbitTiming {
    /// Multiplier applied to every particle's angular velocity this frame.
    pub fn step_scale(&self, delta_seconds: f32) -> f32 {
        match *self {
            OrbitTiming::PerFrame => 1.0,
            OrbitTiming::RealTime { reference_fps } => delta_seconds * reference_fps,
        }
    }
}

/// One orbiting particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// Radians per update, signed. Fixed at creation.
    pub angular_velocity: f32,
}

impl Particle {
    /// Place a particle from polar coordinates around `pivot`.
    pub fn from_polar(pivot: Vec3, angle: f32, distance: f32, height: f32, angular_velocity: f32) -> Self {
        Self {
            position: Vec3::new(
                pivot.x + angle.cos() * distance,
                pivot.y + height,
                pivot.z + angle.sin() * distance,
            ),
            angular_velocity,
        }
    }

    /// Horizontal distance to `pivot`.
    pub fn orbit_radius(&self, pivot: Vec3) -> f32 {
        let dx = self.position.x - pivot.x;
        let dz = self.position.z - pivot.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Horizontal angle around `pivot`, in (-PI, PI].
    pub fn orbit_angle(&self, pivot: Vec3) -> f32 {
        (self.position.z - pivot.z).atan2(self.position.x - pivot.x)
    }
}

/// How a group is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleStyle {
    /// sRGB hex color.
    pub color: u32,
    /// Billboard edge length in world units.
    pub size: f32,
    pub opacity: f32,
}

impl ParticleStyle {
    pub fn linear_rgba(&self) -> [f32; 4] {
        let [r, g, b] = srgb_hex_to_linear(self.color);
        [r, g, b, self.opacity.clamp(0.0, 1.0)]
    }
}

/// Particles sharing a pivot and a render style.
///
/// Positions live in a flat `[x, y, z]` buffer that the renderer uploads as is.
/// Every update flags the buffer; the renderer clears the flag once it has copied it.
#[derive(Debug, Clone)]
pub struct ParticleGroup {
    name: String,
    pivot: Vec3,
    style: ParticleStyle,
    positions: Vec<[f32; 3]>,
    angular_velocities: Vec<f32>,
    needs_upload: bool,
}

impl ParticleGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<String>, pivot: Vec3, style: ParticleStyle) -> Self {
        Self {
            name: name.into(),
            pivot,
            style,
            positions: Vec::new(),
            angular_velocities: Vec::new(),
            needs_upload: true,
        }
    }

    pub fn with_capacity(name: impl Into<String>, pivot: Vec3, style: ParticleStyle, capacity: usize) -> Self {
        let mut group = Self::new(name, pivot, style);
        group.positions.reserve_exact(capacity);
        group.angular_velocities.reserve_exact(capacity);
        group
    }

    pub fn push(&mut self, particle: Particle) {
        self.positions.push(particle.position.to_array());
        self.angular_velocities.push(particle.angular_velocity);
        self.needs_upload = true;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    pub fn style(&self) -> &ParticleStyle {
        &self.style
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Flat position buffer, one `[x, y, z]` per particle.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn particles(&self) -> impl Iterator<Item = Particle> + '_ {
        self.positions
            .iter()
            .zip(&self.angular_velocities)
            .map(|(p, &w)| Particle {
                position: Vec3::from_array(*p),
                angular_velocity: w,
            })
    }

    /// Advance every particle by `angular_velocity * step_scale` radians.
    pub fn advance(&mut self, step_scale: f32) {
        let pivot = self.pivot;
        for (position, &w) in self.positions.iter_mut().zip(&self.angular_velocities) {
            *position = orbit_step(Vec3::from_array(*position), pivot, w * step_scale).to_array();
        }
        self.needs_upload = true;
    }

    /// By-value form of [`advance`](Self::advance).
    pub fn advanced(mut self, step_scale: f32) -> Self {
        self.advance(step_scale);
        self
    }

    /// Whether the position buffer changed since the last upload.
    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    pub fn mark_uploaded(&mut self) {
        self.needs_upload = false;
    }
}

/// Parameters for spawning a [`ParticleGroup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitGroupConfig {
    pub name: String,
    pub count: usize,
    /// Magnitude of every particle's angular velocity; the sign is random.
    pub angular_speed: f32,
    /// Horizontal distance from the pivot.
    pub distance: FloatRange,
    /// Height above the pivot.
    pub height: FloatRange,
    pub style: ParticleStyle,
}

impl OrbitGroupConfig {
    /// Wide, slow amber dust cloud.
    pub fn dust() -> Self {
        Self {
            name: "dust".into(),
            count: 6000,
            angular_speed: 0.002,
            distance: FloatRange::new(5.0, 50.0),
            height: FloatRange::new(2.0, 14.0),
            style: ParticleStyle {
                color: 0xffaa33,
                size: 0.25,
                opacity: 0.8,
            },
        }
    }

    /// Tight, fast blue sparks hugging the hammer.
    pub fn sparks() -> Self {
        Self {
            name: "sparks".into(),
            count: 1500,
            angular_speed: 0.01,
            distance: FloatRange::new(1.5, 8.0),
            height: FloatRange::new(0.3, 6.0),
            style: ParticleStyle {
                color: 0x99ddff,
                size: 0.12,
                opacity: 0.9,
            },
        }
    }

    /// Sample `count` particles around `pivot`.
    pub fn spawn<R: Rng + ?Sized>(&self, pivot: Vec3, rng: &mut R) -> ParticleGroup {
        let mut group = ParticleGroup::with_capacity(self.name.clone(), pivot, self.style, self.count);
        for _ in 0..self.count {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let distance = self.distance.sample(rng);
            let height = self.height.sample(rng);
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            group.push(Particle::from_polar(pivot, angle, distance, height, self.angular_speed * sign));
        }
        log::debug!("Spawned particle group '{}' with {} particles", self.name, group.len());
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::f32::consts::PI;

    fn wrap_angle(a: f32) -> f32 {
        let mut a = a % std::f32::consts::TAU;
        if a > PI {
            a -= std::f32::consts::TAU;
        } else if a <= -PI {
            a += std::f32::consts::TAU;
        }
        a
    }

    #[test]
    fn orbit_step_known_scenario() {
        let p = orbit_step(Vec3::new(5.0, 2.0, 0.0), Vec3::ZERO, 0.01);
        assert!((p.x - 5.0 * 0.01f32.cos()).abs() < 1e-5);
        assert_eq!(p.y, 2.0);
        assert!((p.z - 5.0 * 0.01f32.sin()).abs() < 1e-5);
    }

    #[test]
    fn particle_on_pivot_stays_put() {
        let pivot = Vec3::new(0.0, 0.0, 0.0);
        let mut p = Vec3::new(0.0, 3.5, 0.0);
        for _ in 0..1000 {
            p = orbit_step(p, pivot, 0.37);
        }
        assert_eq!(p, Vec3::new(0.0, 3.5, 0.0));
    }

    #[test]
    fn orbit_preserves_radius_and_height_and_advances_angle() {
        let mut rng = StdRng::seed_from_u64(42);
        let pivot = Vec3::new(3.0, -1.0, -7.0);
        let mut group = OrbitGroupConfig::dust().spawn(pivot, &mut rng);
        let before: Vec<Particle> = group.particles().collect();
        group.advance(1.0);
        for (old, new) in before.iter().zip(group.particles()) {
            let r0 = old.orbit_radius(pivot);
            let r1 = new.orbit_radius(pivot);
            assert!((r0 - r1).abs() < 1e-3 * r0.max(1.0), "radius drifted {r0} -> {r1}");
            assert_eq!(old.position.y, new.position.y);
            let expected = wrap_angle(old.orbit_angle(pivot) + old.angular_velocity);
            let diff = wrap_angle(new.orbit_angle(pivot) - expected);
            assert!(diff.abs() < 1e-3, "angle off by {diff}");
        }
    }

    #[test]
    fn radius_holds_over_many_frames() {
        let pivot = Vec3::new(1.0, 0.0, 1.0);
        let start = Vec3::new(11.0, 4.0, 1.0);
        let mut p = start;
        for _ in 0..1000 {
            p = orbit_step(p, pivot, 0.002);
        }
        let r = Vec3::new(p.x - pivot.x, 0.0, p.z - pivot.z).length();
        assert!((r - 10.0).abs() < 1e-2);
        assert_eq!(p.y, 4.0);
    }

    #[test]
    fn spawn_respects_ranges_and_is_seeded() {
        let config = OrbitGroupConfig::sparks();
        let pivot = Vec3::new(0.0, 1.0, 0.0);
        let a = config.spawn(pivot, &mut StdRng::seed_from_u64(9));
        let b = config.spawn(pivot, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.len(), config.count);
        assert_eq!(a.positions(), b.positions());

        for p in a.particles() {
            let r = p.orbit_radius(pivot);
            assert!(r >= config.distance.min - 1e-3 && r <= config.distance.max + 1e-3);
            let h = p.position.y - pivot.y;
            assert!(h >= config.height.min - 1e-4 && h <= config.height.max + 1e-4);
            assert_eq!(p.angular_velocity.abs(), config.angular_speed);
        }
    }

    #[test]
    fn spawn_splits_rotation_direction_evenly() {
        let group = OrbitGroupConfig::dust().spawn(Vec3::ZERO, &mut StdRng::seed_from_u64(3));
        let clockwise = group.particles().filter(|p| p.angular_velocity < 0.0).count();
        let fraction = clockwise as f32 / group.len() as f32;
        assert!((fraction - 0.5).abs() < 0.05, "fraction {fraction}");
    }

    #[test]
    fn advance_flags_buffer_for_upload() {
        let mut group = ParticleGroup::new("test", Vec3::ZERO, OrbitGroupConfig::dust().style);
        group.push(Particle::from_polar(Vec3::ZERO, 0.0, 4.0, 1.0, 0.1));
        assert!(group.needs_upload());
        group.mark_uploaded();
        assert!(!group.needs_upload());
        group.advance(1.0);
        assert!(group.needs_upload());
    }

    #[test]
    fn advanced_matches_in_place_advance() {
        let config = OrbitGroupConfig::sparks();
        let mut in_place = config.spawn(Vec3::ZERO, &mut StdRng::seed_from_u64(5));
        let by_value = in_place.clone().advanced(1.0);
        in_place.advance(1.0);
        assert_eq!(in_place.positions(), by_value.positions());
    }

    #[test]
    fn real_time_timing_scales_with_delta() {
        assert_eq!(OrbitTiming::PerFrame.step_scale(0.5), 1.0);
        let timing = OrbitTiming::RealTime { reference_fps: 60.0 };
        assert!((timing.step_scale(1.0 / 60.0) - 1.0).abs() < 1e-6);
        assert!((timing.step_scale(1.0 / 30.0) - 2.0).abs() < 1e-6);
    }
}
