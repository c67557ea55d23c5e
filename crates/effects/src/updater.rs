//! The per-frame effects update: every particle group orbits, every light bank flickers.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flicker::{FlickerBank, FlickerBankConfig, FlickerPolicy, IntensityDistribution};
use crate::orbit::{OrbitGroupConfig, OrbitTiming, ParticleGroup};
use crate::range::FloatRange;

/// A configured value that spawning or the per-frame update cannot use.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectsConfigError {
    #[error("{field}: range {min}..{max} needs finite bounds with min <= max")]
    Range { field: String, min: f32, max: f32 },
    #[error("{field}: probability {value} is outside [0, 1]")]
    Probability { field: String, value: f32 },
    #[error("{field}: {value} is not a finite number")]
    NotFinite { field: String, value: f32 },
    #[error("{field}: {value} must be finite and >= 0")]
    Negative { field: String, value: f32 },
}

fn check_range(field: impl FnOnce() -> String, range: FloatRange) -> Result<(), EffectsConfigError> {
    if range.is_valid() {
        Ok(())
    } else {
        Err(EffectsConfigError::Range {
            field: field(),
            min: range.min,
            max: range.max,
        })
    }
}

fn check_probability(field: impl FnOnce() -> String, value: f32) -> Result<(), EffectsConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EffectsConfigError::Probability { field: field(), value })
    }
}

fn check_finite(field: impl FnOnce() -> String, value: f32) -> Result<(), EffectsConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EffectsConfigError::NotFinite { field: field(), value })
    }
}

fn check_non_negative(field: impl FnOnce() -> String, value: f32) -> Result<(), EffectsConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EffectsConfigError::Negative { field: field(), value })
    }
}

/// Effects layout for a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectsConfig {
    #[serde(default)]
    pub timing: OrbitTiming,
    #[serde(default = "default_groups")]
    pub groups: Vec<OrbitGroupConfig>,
    #[serde(default = "default_banks")]
    pub banks: Vec<FlickerBankConfig>,
}

fn default_groups() -> Vec<OrbitGroupConfig> {
    vec![OrbitGroupConfig::dust(), OrbitGroupConfig::sparks()]
}

fn default_banks() -> Vec<FlickerBankConfig> {
    vec![FlickerBankConfig::storm_ring(), FlickerBankConfig::core_glow()]
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            timing: OrbitTiming::default(),
            groups: default_groups(),
            banks: default_banks(),
        }
    }
}

impl EffectsConfig {
    /// Reject values that would produce NaN positions or make sampling panic.
    pub fn validate(&self) -> Result<(), EffectsConfigError> {
        if let OrbitTiming::RealTime { reference_fps } = self.timing {
            check_non_negative(|| "timing.reference_fps".into(), reference_fps)?;
        }
        for group in &self.groups {
            let name = &group.name;
            check_finite(|| format!("group '{name}' angular_speed"), group.angular_speed)?;
            check_range(|| format!("group '{name}' distance"), group.distance)?;
            check_range(|| format!("group '{name}' height"), group.height)?;
            check_non_negative(|| format!("group '{name}' size"), group.style.size)?;
            check_finite(|| format!("group '{name}' opacity"), group.style.opacity)?;
        }
        for bank in &self.banks {
            let name = &bank.name;
            check_finite(|| format!("bank '{name}' radius"), bank.ring.radius)?;
            check_range(|| format!("bank '{name}' height"), bank.ring.height)?;
            check_non_negative(|| format!("bank '{name}' range"), bank.ring.range)?;
            match bank.policy {
                FlickerPolicy::PerFrameRandom {
                    on_probability,
                    intensity,
                } => {
                    check_probability(|| format!("bank '{name}' on_probability"), on_probability)?;
                    check_range(|| format!("bank '{name}' intensity"), intensity)?;
                }
                FlickerPolicy::Cooldown {
                    cooldown, intensity, ..
                } => {
                    check_range(|| format!("bank '{name}' cooldown"), cooldown)?;
                    match intensity {
                        IntensityDistribution::Uniform(range) => {
                            check_range(|| format!("bank '{name}' intensity"), range)?;
                        }
                        IntensityDistribution::Tiered {
                            off_chance,
                            dim_chance,
                            dim,
                            bright,
                        } => {
                            check_probability(|| format!("bank '{name}' off_chance"), off_chance)?;
                            check_probability(|| format!("bank '{name}' dim_chance"), dim_chance)?;
                            check_range(|| format!("bank '{name}' dim"), dim)?;
                            check_range(|| format!("bank '{name}' bright"), bright)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// All animated state of the scene, owned in one place.
#[derive(Debug, Clone)]
pub struct SceneEffects {
    pub timing: OrbitTiming,
    pub groups: Vec<ParticleGroup>,
    pub banks: Vec<FlickerBank>,
}

impl SceneEffects {
    /// Spawn every configured group and bank around `pivot`.
    pub fn spawn<R: Rng + ?Sized>(config: &EffectsConfig, pivot: Vec3, rng: &mut R) -> Self {
        let groups = config.groups.iter().map(|g| g.spawn(pivot, rng)).collect();
        let banks = config.banks.iter().map(|b| b.spawn(pivot, rng)).collect();
        Self {
            timing: config.timing,
            groups,
            banks,
        }
    }

    /// One frame: orbit all particles, then flicker all lights.
    pub fn update<R: Rng + ?Sized>(&mut self, delta_seconds: f32, rng: &mut R) {
        let step_scale = self.timing.step_scale(delta_seconds);
        for group in &mut self.groups {
            group.advance(step_scale);
        }
        for bank in &mut self.banks {
            bank.update(delta_seconds, rng);
        }
    }

    pub fn particle_count(&self) -> usize {
        self.groups.iter().map(ParticleGroup::len).sum()
    }

    pub fn light_count(&self) -> usize {
        self.banks.iter().map(|b| b.lights().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flicker::TimerSharing;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn default_scene_has_two_groups_and_two_banks() {
        let mut rng = StdRng::seed_from_u64(1);
        let effects = SceneEffects::spawn(&EffectsConfig::default(), Vec3::ZERO, &mut rng);
        assert_eq!(effects.groups.len(), 2);
        assert_eq!(effects.banks.len(), 2);
        assert_eq!(effects.particle_count(), 7500);
        assert_eq!(effects.light_count(), 8);
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EffectsConfig::default().validate(), Ok(()));
    }

    #[test]
    fn nan_probability_is_rejected() {
        let mut config = EffectsConfig::default();
        config.banks[1].policy = FlickerPolicy::PerFrameRandom {
            on_probability: f32::NAN,
            intensity: FloatRange::new(0.5, 2.0),
        };
        assert!(matches!(
            config.validate(),
            Err(EffectsConfigError::Probability { ref field, .. }) if field.contains("core glow")
        ));
    }

    #[test]
    fn infinite_or_inverted_ranges_are_rejected() {
        let mut config = EffectsConfig::default();
        config.groups[0].distance = FloatRange::new(0.0, f32::INFINITY);
        assert!(matches!(config.validate(), Err(EffectsConfigError::Range { .. })));

        let mut config = EffectsConfig::default();
        config.banks[0].policy = FlickerPolicy::Cooldown {
            sharing: TimerSharing::Shared,
            cooldown: FloatRange::new(2.0, 0.5),
            intensity: IntensityDistribution::default(),
        };
        assert!(matches!(config.validate(), Err(EffectsConfigError::Range { .. })));
    }

    #[test]
    fn non_finite_scalars_are_rejected() {
        let mut config = EffectsConfig::default();
        config.groups[1].angular_speed = f32::NAN;
        assert!(matches!(config.validate(), Err(EffectsConfigError::NotFinite { .. })));

        let mut config = EffectsConfig::default();
        config.timing = OrbitTiming::RealTime { reference_fps: f32::INFINITY };
        assert!(matches!(config.validate(), Err(EffectsConfigError::Negative { .. })));
    }

    #[test]
    fn update_moves_particles_but_never_heights() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut effects = SceneEffects::spawn(&EffectsConfig::default(), Vec3::ZERO, &mut rng);
        let before: Vec<[f32; 3]> = effects.groups[0].positions().to_vec();
        for group in &mut effects.groups {
            group.mark_uploaded();
        }
        effects.update(1.0 / 60.0, &mut rng);
        let after = effects.groups[0].positions();
        assert!(effects.groups.iter().all(ParticleGroup::needs_upload));
        assert!(before.iter().zip(after).any(|(a, b)| a != b));
        assert!(before.iter().zip(after).all(|(a, b)| a[1] == b[1]));
    }

    #[test]
    fn real_time_timing_is_frame_rate_independent() {
        let config = EffectsConfig {
            timing: OrbitTiming::RealTime { reference_fps: 60.0 },
            groups: vec![OrbitGroupConfig::sparks()],
            banks: Vec::new(),
        };
        let mut fast = SceneEffects::spawn(&config, Vec3::ZERO, &mut StdRng::seed_from_u64(4));
        let mut slow = fast.clone();
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..120 {
            fast.update(1.0 / 120.0, &mut rng);
        }
        for _ in 0..30 {
            slow.update(1.0 / 30.0, &mut rng);
        }
        for (a, b) in fast.groups[0].particles().zip(slow.groups[0].particles()) {
            assert!((a.position - b.position).length() < 1e-2);
        }
    }
}
