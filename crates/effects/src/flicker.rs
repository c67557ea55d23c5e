//! Flickering point lights.
//!
//! A [`FlickerBank`] owns a set of lights and one [`FlickerPolicy`]. Per-frame-random
//! banks redraw every light every frame; cooldown banks redraw when a timer fires.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::srgb_hex_to_linear;
use crate::range::FloatRange;

/// A point light whose intensity is driven by a flicker policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlickerLight {
    pub position: Vec3,
    pub intensity: f32,
    /// Linear RGB.
    pub base_color: [f32; 3],
    /// Attenuation distance; 0 means unlimited.
    pub range: f32,
}

impl FlickerLight {
    /// A light that starts dark.
    pub fn new(position: Vec3, base_color: [f32; 3], range: f32) -> Self {
        Self {
            position,
            intensity: 0.0,
            base_color,
            range,
        }
    }

    pub fn is_on(&self) -> bool {
        self.intensity > 0.0
    }

    /// Color scaled by the current intensity.
    pub fn radiance(&self) -> [f32; 3] {
        self.base_color.map(|c| c * self.intensity)
    }
}

/// Where a redrawn intensity comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IntensityDistribution {
    Uniform(FloatRange),
    /// `off_chance` of 0, `dim_chance` of a `dim` value, the rest a `bright` value.
    Tiered {
        off_chance: f32,
        dim_chance: f32,
        dim: FloatRange,
        bright: FloatRange,
    },
}

impl Default for IntensityDistribution {
    fn default() -> Self {
        IntensityDistribution::Tiered {
            off_chance: 0.2,
            dim_chance: 0.6,
            dim: FloatRange::new(0.3, 1.0),
            bright: FloatRange::new(2.0, 4.0),
        }
    }
}

impl IntensityDistribution {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        match self {
            IntensityDistribution::Uniform(range) => range.sample(rng),
            IntensityDistribution::Tiered {
                off_chance,
                dim_chance,
                dim,
                bright,
            } => {
                let roll: f32 = rng.gen();
                if roll < *off_chance {
                    0.0
                } else if roll < off_chance + dim_chance {
                    dim.sample(rng)
                } else {
                    bright.sample(rng)
                }
            }
        }
    }
}

/// Accumulates frame time and fires once the randomized cooldown has passed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlickerTimer {
    cooldown_seconds: f32,
    elapsed_seconds: f32,
    cooldown_range: FloatRange,
}

impl FlickerTimer {
    pub fn new<R: Rng + ?Sized>(cooldown_range: FloatRange, rng: &mut R) -> Self {
        Self {
            cooldown_seconds: cooldown_range.sample(rng),
            elapsed_seconds: 0.0,
            cooldown_range,
        }
    }

    /// Add `delta_seconds`. Returns true when the timer fires, in which case elapsed
    /// time is reset to 0 and a new cooldown is drawn.
    pub fn tick<R: Rng + ?Sized>(&mut self, delta_seconds: f32, rng: &mut R) -> bool {
        self.elapsed_seconds += delta_seconds;
        if self.elapsed_seconds > self.cooldown_seconds {
            self.elapsed_seconds = 0.0;
            self.cooldown_seconds = self.cooldown_range.sample(rng);
            true
        } else {
            false
        }
    }

    pub fn cooldown_seconds(&self) -> f32 {
        self.cooldown_seconds
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed_seconds
    }

    pub fn cooldown_range(&self) -> FloatRange {
        self.cooldown_range
    }
}

/// Whether cooldown lights flicker together or independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimerSharing {
    /// One timer for the whole bank; every light is redrawn when it fires.
    #[default]
    Shared,
    PerLight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FlickerPolicy {
    /// Every frame each light is on with `on_probability`, else forced to 0.
    PerFrameRandom {
        on_probability: f32,
        intensity: FloatRange,
    },
    /// Lights are redrawn from `intensity` whenever their timer fires.
    Cooldown {
        sharing: TimerSharing,
        cooldown: FloatRange,
        intensity: IntensityDistribution,
    },
}

impl Default for FlickerPolicy {
    fn default() -> Self {
        FlickerPolicy::Cooldown {
            sharing: TimerSharing::Shared,
            cooldown: FloatRange::new(0.3, 1.8),
            intensity: IntensityDistribution::default(),
        }
    }
}

/// Lights sharing one flicker policy.
#[derive(Debug, Clone)]
pub struct FlickerBank {
    name: String,
    lights: Vec<FlickerLight>,
    policy: FlickerPolicy,
    timers: Vec<FlickerTimer>,
}

impl FlickerBank {
    pub fn new<R: Rng + ?Sized>(
        name: impl Into<String>,
        lights: Vec<FlickerLight>,
        policy: FlickerPolicy,
        rng: &mut R,
    ) -> Self {
        let timers = match policy {
            FlickerPolicy::PerFrameRandom { .. } => Vec::new(),
            FlickerPolicy::Cooldown {
                sharing: TimerSharing::Shared,
                cooldown,
                ..
            } => vec![FlickerTimer::new(cooldown, rng)],
            FlickerPolicy::Cooldown {
                sharing: TimerSharing::PerLight,
                cooldown,
                ..
            } => (0..lights.len()).map(|_| FlickerTimer::new(cooldown, rng)).collect(),
        };
        Self {
            name: name.into(),
            lights,
            policy,
            timers,
        }
    }

    /// Advance the bank by one frame.
    pub fn update<R: Rng + ?Sized>(&mut self, delta_seconds: f32, rng: &mut R) {
        match self.policy {
            FlickerPolicy::PerFrameRandom {
                on_probability,
                intensity,
            } => {
                let p = if on_probability.is_nan() {
                    0.0
                } else {
                    f64::from(on_probability.clamp(0.0, 1.0))
                };
                for light in &mut self.lights {
                    light.intensity = if rng.gen_bool(p) { intensity.sample(rng) } else { 0.0 };
                }
            }
            FlickerPolicy::Cooldown {
                sharing: TimerSharing::Shared,
                intensity,
                ..
            } => {
                let Some(timer) = self.timers.first_mut() else {
                    return;
                };
                if timer.tick(delta_seconds, rng) {
                    for light in &mut self.lights {
                        light.intensity = intensity.sample(rng);
                    }
                }
            }
            FlickerPolicy::Cooldown {
                sharing: TimerSharing::PerLight,
                intensity,
                ..
            } => {
                for (light, timer) in self.lights.iter_mut().zip(&mut self.timers) {
                    if timer.tick(delta_seconds, rng) {
                        light.intensity = intensity.sample(rng);
                    }
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lights(&self) -> &[FlickerLight] {
        &self.lights
    }

    pub fn policy(&self) -> &FlickerPolicy {
        &self.policy
    }

    pub fn timers(&self) -> &[FlickerTimer] {
        &self.timers
    }
}

/// Lights spaced evenly on a horizontal circle around a pivot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightRingConfig {
    pub count: usize,
    pub radius: f32,
    /// Height above the pivot, drawn per light.
    pub height: FloatRange,
    /// sRGB hex color.
    pub color: u32,
    pub range: f32,
}

impl Default for LightRingConfig {
    fn default() -> Self {
        Self {
            count: 5,
            radius: 10.0,
            height: FloatRange::new(2.0, 4.0),
            color: 0x33ccff,
            range: 20.0,
        }
    }
}

impl LightRingConfig {
    pub fn spawn<R: Rng + ?Sized>(&self, pivot: Vec3, rng: &mut R) -> Vec<FlickerLight> {
        let color = srgb_hex_to_linear(self.color);
        (0..self.count)
            .map(|i| {
                let angle = i as f32 / self.count as f32 * std::f32::consts::TAU;
                let position = Vec3::new(
                    pivot.x + angle.cos() * self.radius,
                    pivot.y + self.height.sample(rng),
                    pivot.z + angle.sin() * self.radius,
                );
                FlickerLight::new(position, color, self.range)
            })
            .collect()
    }
}

/// Everything needed to build a [`FlickerBank`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlickerBankConfig {
    pub name: String,
    pub ring: LightRingConfig,
    pub policy: FlickerPolicy,
}

impl FlickerBankConfig {
    /// Lightning-blue ring that crackles on a shared cooldown.
    pub fn storm_ring() -> Self {
        Self {
            name: "storm ring".into(),
            ring: LightRingConfig::default(),
            policy: FlickerPolicy::default(),
        }
    }

    /// A few small lights around the hammer head, flickering every frame.
    pub fn core_glow() -> Self {
        Self {
            name: "core glow".into(),
            ring: LightRingConfig {
                count: 3,
                radius: 1.2,
                height: FloatRange::new(1.5, 2.5),
                color: 0x66e0ff,
                range: 6.0,
            },
            policy: FlickerPolicy::PerFrameRandom {
                on_probability: 0.2,
                intensity: FloatRange::new(0.5, 2.0),
            },
        }
    }

    pub fn spawn<R: Rng + ?Sized>(&self, pivot: Vec3, rng: &mut R) -> FlickerBank {
        let lights = self.ring.spawn(pivot, rng);
        FlickerBank::new(self.name.clone(), lights, self.policy, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn per_frame_random_on_fraction_matches_probability() {
        let mut rng = StdRng::seed_from_u64(2024);
        let lights = vec![FlickerLight::new(Vec3::ZERO, [1.0; 3], 10.0)];
        let policy = FlickerPolicy::PerFrameRandom {
            on_probability: 0.2,
            intensity: FloatRange::new(0.5, 2.0),
        };
        let mut bank = FlickerBank::new("test", lights, policy, &mut rng);

        let frames = 100_000;
        let mut on = 0;
        for _ in 0..frames {
            bank.update(1.0 / 60.0, &mut rng);
            let light = bank.lights()[0];
            if light.is_on() {
                assert!(light.intensity >= 0.5 && light.intensity < 2.0);
                on += 1;
            } else {
                assert_eq!(light.intensity, 0.0);
            }
        }
        let fraction = on as f32 / frames as f32;
        assert!((fraction - 0.2).abs() < 0.02, "on fraction {fraction}");
    }

    #[test]
    fn nan_probability_keeps_lights_dark() {
        let mut rng = StdRng::seed_from_u64(3);
        let lights = vec![FlickerLight::new(Vec3::ZERO, [1.0; 3], 10.0); 2];
        let policy = FlickerPolicy::PerFrameRandom {
            on_probability: f32::NAN,
            intensity: FloatRange::new(0.5, 2.0),
        };
        let mut bank = FlickerBank::new("nan", lights, policy, &mut rng);
        for _ in 0..100 {
            bank.update(1.0 / 60.0, &mut rng);
        }
        assert!(bank.lights().iter().all(|l| l.intensity == 0.0));
    }

    #[test]
    fn timer_resets_and_redraws_cooldown_on_fire() {
        let mut rng = StdRng::seed_from_u64(11);
        let range = FloatRange::new(0.3, 1.8);
        let mut timer = FlickerTimer::new(range, &mut rng);
        assert!(range.contains(timer.cooldown_seconds()));

        let mut fired = 0;
        for _ in 0..2000 {
            if timer.tick(1.0 / 60.0, &mut rng) {
                fired += 1;
                assert_eq!(timer.elapsed_seconds(), 0.0);
                assert!(range.contains(timer.cooldown_seconds()));
            } else {
                assert!(timer.elapsed_seconds() <= timer.cooldown_seconds());
            }
        }
        assert!(fired > 0);
    }

    #[test]
    fn timer_fires_only_after_exceeding_cooldown() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut timer = FlickerTimer::new(FloatRange::constant(1.0), &mut rng);
        assert!(!timer.tick(0.5, &mut rng));
        assert!(!timer.tick(0.5, &mut rng));
        assert!(timer.tick(0.01, &mut rng));
        assert_eq!(timer.elapsed_seconds(), 0.0);
    }

    #[test]
    fn shared_timer_redraws_all_lights_together() {
        let mut rng = StdRng::seed_from_u64(5);
        let policy = FlickerPolicy::Cooldown {
            sharing: TimerSharing::Shared,
            cooldown: FloatRange::constant(0.1),
            intensity: IntensityDistribution::Uniform(FloatRange::new(1.0, 2.0)),
        };
        let lights = LightRingConfig::default().spawn(Vec3::ZERO, &mut rng);
        let mut bank = FlickerBank::new("ring", lights, policy, &mut rng);
        assert_eq!(bank.timers().len(), 1);

        bank.update(0.05, &mut rng);
        assert!(bank.lights().iter().all(|l| l.intensity == 0.0));
        bank.update(0.06, &mut rng);
        assert!(bank.lights().iter().all(|l| l.intensity >= 1.0 && l.intensity < 2.0));
    }

    #[test]
    fn per_light_timers_fire_independently() {
        let mut rng = StdRng::seed_from_u64(8);
        let policy = FlickerPolicy::Cooldown {
            sharing: TimerSharing::PerLight,
            cooldown: FloatRange::new(0.0, 2.0),
            intensity: IntensityDistribution::Uniform(FloatRange::new(1.0, 2.0)),
        };
        let lights = LightRingConfig::default().spawn(Vec3::ZERO, &mut rng);
        let mut bank = FlickerBank::new("ring", lights, policy, &mut rng);
        assert_eq!(bank.timers().len(), bank.lights().len());

        // Step until the first light fires and check at least one other did not.
        let mut saw_split = false;
        for _ in 0..200 {
            bank.update(0.01, &mut rng);
            let on = bank.lights().iter().filter(|l| l.is_on()).count();
            if on > 0 && on < bank.lights().len() {
                saw_split = true;
                break;
            }
        }
        assert!(saw_split);
    }

    #[test]
    fn tiered_distribution_frequencies() {
        let mut rng = StdRng::seed_from_u64(99);
        let dist = IntensityDistribution::default();
        let n = 50_000;
        let (mut off, mut dim, mut bright) = (0, 0, 0);
        for _ in 0..n {
            let v = dist.sample(&mut rng);
            if v == 0.0 {
                off += 1;
            } else if v < 1.0 {
                dim += 1;
            } else {
                assert!(v >= 2.0 && v < 4.0);
                bright += 1;
            }
        }
        let f = |c: i32| c as f32 / n as f32;
        assert!((f(off) - 0.2).abs() < 0.02);
        assert!((f(dim) - 0.6).abs() < 0.02);
        assert!((f(bright) - 0.2).abs() < 0.02);
    }

    #[test]
    fn ring_lights_are_evenly_spaced_and_start_dark() {
        let mut rng = StdRng::seed_from_u64(3);
        let pivot = Vec3::new(2.0, 1.0, -3.0);
        let config = LightRingConfig::default();
        let lights = config.spawn(pivot, &mut rng);
        assert_eq!(lights.len(), 5);
        for light in &lights {
            let horizontal = Vec3::new(light.position.x - pivot.x, 0.0, light.position.z - pivot.z);
            assert!((horizontal.length() - config.radius).abs() < 1e-4);
            let h = light.position.y - pivot.y;
            assert!(h >= 2.0 - 1e-5 && h < 4.0 + 1e-5);
            assert!(!light.is_on());
        }
        let first = &lights[0];
        assert!((first.position.x - (pivot.x + config.radius)).abs() < 1e-4);
    }

    #[test]
    fn radiance_scales_color() {
        let mut light = FlickerLight::new(Vec3::ZERO, [0.5, 1.0, 0.25], 0.0);
        light.intensity = 2.0;
        assert_eq!(light.radiance(), [1.0, 2.0, 0.5]);
    }
}
