//! Scene contents on the CPU: generated ground and stones, the animated effects, and
//! the centerpiece once it has loaded. Nothing here touches the GPU.

use effects::{srgb_hex_to_linear, EffectsConfig, SceneEffects};
use engine_core::Transform;
use glam::Vec3;
use procgen::{generate_rock_set, scatter_stones, Ground, Placement, SurfaceMesh};
use rand::{rngs::StdRng, Rng, SeedableRng};
use renderer::{LightsUniform, ModelData, PointLightRaw, MAX_POINT_LIGHTS};

use crate::config::{CenterpieceConfig, LightingConfig, SceneConfig};

/// Offset mixed into the seed for stone placement, so it does not share a stream
/// with the effects.
const SCATTER_STREAM: u64 = 0x5ca7_7e12;

/// The loaded model and where it stands.
pub struct Centerpiece {
    pub model: ModelData,
    pub transform: Transform,
}

pub struct SceneState {
    pivot: Vec3,
    rng: StdRng,
    paused: bool,

    pub effects: SceneEffects,
    pub ground: Ground,
    pub ground_mesh: SurfaceMesh,
    pub rock_meshes: Vec<SurfaceMesh>,
    pub stones: Vec<Placement>,
    centerpiece: Option<Centerpiece>,
}

impl SceneState {
    /// Generate the whole scene from `seed`.
    pub fn new(config: &SceneConfig, seed: u64) -> Self {
        let pivot = config.pivot();

        let ground = Ground::new(config.ground, seed);
        let ground_mesh = ground.mesh();
        let rock_meshes = generate_rock_set(&config.rocks, seed, config.rock_variants.max(1));
        let mut scatter_rng = StdRng::seed_from_u64(seed ^ SCATTER_STREAM);
        let stones = scatter_stones(&config.scatter, pivot, &ground, rock_meshes.len(), &mut scatter_rng);

        let mut rng = StdRng::seed_from_u64(seed);
        let effects = SceneEffects::spawn(&config.effects, pivot, &mut rng);

        log::info!(
            "Scene seed {}: {} stones, {} particles in {} groups, {} flicker lights",
            seed,
            stones.len(),
            effects.particle_count(),
            effects.groups.len(),
            effects.light_count()
        );

        let scene = Self {
            pivot,
            rng,
            paused: false,
            effects,
            ground,
            ground_mesh,
            rock_meshes,
            stones,
            centerpiece: None,
        };
        let unlit = scene.unlit_light_count();
        if unlit > 0 {
            log::warn!(
                "{} flicker lights configured but only {} are rendered; the last {} stay dark",
                scene.effects.light_count(),
                MAX_POINT_LIGHTS,
                unlit
            );
        }
        scene
    }

    /// Flicker lights past the renderer's point-light slots. They are animated but
    /// never reach the shader.
    pub fn unlit_light_count(&self) -> usize {
        self.effects.light_count().saturating_sub(MAX_POINT_LIGHTS)
    }

    /// Returns the new paused state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Advance particles and lights by one frame. Does nothing while paused.
    pub fn update(&mut self, delta_seconds: f32) {
        if !self.paused {
            self.effects.update(delta_seconds, &mut self.rng);
        }
    }

    /// Respawn every particle group and light bank from a fresh seed drawn from the
    /// current stream. Ground and stones stay.
    pub fn reseed(&mut self, config: &EffectsConfig) -> u64 {
        let seed = self.rng.gen();
        self.rng = StdRng::seed_from_u64(seed);
        self.effects = SceneEffects::spawn(config, self.pivot, &mut self.rng);
        log::info!("Reseeded effects with seed {}", seed);
        seed
    }

    /// Place a freshly loaded model at the pivot.
    pub fn attach_centerpiece(&mut self, model: ModelData, config: &CenterpieceConfig) -> &Centerpiece {
        let offset = Vec3::from_array(config.offset);
        let mut position = self.pivot + offset;
        if config.rest_on_ground {
            let lowest = model.bounds().map_or(0.0, |(lo, _)| lo.y);
            position.y = self.ground.height_at(position.x, position.z) + offset.y - lowest * config.scale;
        }
        let transform = Transform::from_position_yaw_scale(position, config.yaw_degrees.to_radians(), config.scale);
        log::info!(
            "Centerpiece attached at {:?} ({} triangles)",
            transform.position,
            model.triangle_count()
        );
        self.centerpiece.insert(Centerpiece { model, transform })
    }

    /// Static lighting plus every flicker light's current radiance.
    pub fn lights(&self, lighting: &LightingConfig) -> LightsUniform {
        let rgb = |hex: u32, intensity: f32| {
            let [r, g, b] = srgb_hex_to_linear(hex);
            [r * intensity, g * intensity, b * intensity, 0.0]
        };
        let sun = Vec3::from_array(lighting.sun_direction).normalize_or_zero();
        let [fr, fg, fb] = srgb_hex_to_linear(lighting.background);

        let mut uniform = LightsUniform {
            ambient: rgb(lighting.ambient_color, lighting.ambient_intensity),
            sun_direction: [sun.x, sun.y, sun.z, 0.0],
            sun_color: rgb(lighting.sun_color, lighting.sun_intensity),
            fog: [fr, fg, fb, lighting.fog_density],
            ..Default::default()
        };
        uniform.set_points(self.effects.banks.iter().flat_map(|bank| bank.lights()).map(|light| {
            let [r, g, b] = light.radiance();
            PointLightRaw {
                position_range: [light.position.x, light.position.y, light.position.z, light.range],
                radiance: [r, g, b, 0.0],
            }
        }));
        uniform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effects::FlickerBankConfig;
    use renderer::{MeshData, Vertex};

    fn small_config() -> SceneConfig {
        let mut config = SceneConfig::default();
        config.ground.resolution = 9;
        config.scatter.count = 10;
        config.rock_variants = 2;
        for group in &mut config.effects.groups {
            group.count = 50;
        }
        config
    }

    fn cube_model(min_y: f32) -> ModelData {
        let vertex = |x: f32, y: f32, z: f32| Vertex::new([x, y, z], [0.0, 1.0, 0.0], [0.0; 2]);
        ModelData {
            meshes: vec![MeshData::new(
                vec![vertex(-1.0, min_y, -1.0), vertex(1.0, min_y, 1.0), vertex(0.0, min_y + 2.0, 0.0)],
                vec![0, 1, 2],
            )],
        }
    }

    #[test]
    fn same_seed_builds_same_scene() {
        let config = small_config();
        let a = SceneState::new(&config, 9);
        let b = SceneState::new(&config, 9);
        assert_eq!(a.stones, b.stones);
        assert_eq!(a.effects.groups[0].positions(), b.effects.groups[0].positions());
        assert_eq!(a.effects.particle_count(), 100);
        assert_eq!(a.rock_meshes.len(), 2);
    }

    #[test]
    fn pause_freezes_particles() {
        let mut scene = SceneState::new(&small_config(), 1);
        let before = scene.effects.groups[0].positions().to_vec();
        assert!(scene.toggle_pause());
        scene.update(1.0 / 60.0);
        assert_eq!(scene.effects.groups[0].positions(), &before[..]);

        assert!(!scene.toggle_pause());
        scene.update(1.0 / 60.0);
        assert_ne!(scene.effects.groups[0].positions(), &before[..]);
    }

    #[test]
    fn reseed_changes_effects_but_keeps_stones() {
        let config = small_config();
        let mut scene = SceneState::new(&config, 4);
        let stones = scene.stones.clone();
        let before = scene.effects.groups[0].positions().to_vec();
        let seed = scene.reseed(&config.effects);
        let mut twin = SceneState::new(&config, 4);
        assert_eq!(twin.reseed(&config.effects), seed);
        assert_eq!(scene.stones, stones);
        assert_ne!(scene.effects.groups[0].positions(), &before[..]);
        assert_eq!(scene.effects.particle_count(), 100);
    }

    #[test]
    fn centerpiece_rests_on_ground() {
        let mut scene = SceneState::new(&small_config(), 2);
        let config = CenterpieceConfig {
            scale: 2.0,
            ..Default::default()
        };
        let ground_y = scene.ground.height_at(0.0, 0.0);
        let placed = scene.attach_centerpiece(cube_model(-0.5), &config);
        // Lowest vertex (-0.5 * 2) lands on the sand.
        assert!((placed.transform.position.y - (ground_y + 1.0)).abs() < 1e-5);
        assert!(scene.centerpiece.is_some());
    }

    #[test]
    fn centerpiece_can_float_at_pivot() {
        let mut scene = SceneState::new(&small_config(), 2);
        let config = CenterpieceConfig {
            rest_on_ground: false,
            offset: [0.0, 3.0, 0.0],
            ..Default::default()
        };
        let placed = scene.attach_centerpiece(cube_model(-0.5), &config);
        assert_eq!(placed.transform.position, Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn lights_include_every_flicker_light() {
        let mut scene = SceneState::new(&small_config(), 3);
        for _ in 0..120 {
            scene.update(1.0 / 60.0);
        }
        let uniform = scene.lights(&LightingConfig::default());
        assert_eq!(uniform.point_count(), scene.effects.light_count());
        let first = scene.effects.banks[0].lights()[0];
        assert_eq!(uniform.points[0].position_range[3], first.range);
        assert_eq!(uniform.points[0].radiance[..3], first.radiance());
        assert!(uniform.fog[3] > 0.0);
    }

    #[test]
    fn lights_past_the_shader_slots_are_counted() {
        let mut config = small_config();
        assert_eq!(SceneState::new(&config, 5).unlit_light_count(), 0);

        let mut extra = FlickerBankConfig::core_glow();
        extra.name = "extra".into();
        config.effects.banks.push(extra);
        let scene = SceneState::new(&config, 5);
        assert_eq!(scene.effects.light_count(), MAX_POINT_LIGHTS + 3);
        assert_eq!(scene.unlit_light_count(), 3);
        assert_eq!(scene.lights(&LightingConfig::default()).point_count(), MAX_POINT_LIGHTS);
    }
}
