//! Scene configuration (window, content, effects, camera, lighting). Loaded from
//! config.ron at startup.

use effects::EffectsConfig;
use glam::Vec3;
use procgen::{GroundConfig, RockConfig, ScatterConfig};
use renderer::OrbitCamera;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent scene settings. Every field falls back to its compiled-in default, so a
/// partial `config.ron` only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_true")]
    pub vsync: bool,
    /// Seed for every random draw. `None` picks one at startup (and it is logged).
    #[serde(default)]
    pub seed: Option<u64>,
    /// glTF/GLB file for the centerpiece.
    #[serde(default = "default_asset_path")]
    pub asset_path: PathBuf,
    /// Point everything orbits and the centerpiece stands on.
    #[serde(default)]
    pub pivot: [f32; 3],
    #[serde(default)]
    pub centerpiece: CenterpieceConfig,
    #[serde(default)]
    pub effects: EffectsConfig,
    #[serde(default)]
    pub ground: GroundConfig,
    #[serde(default)]
    pub rocks: RockConfig,
    /// Distinct stone meshes to generate.
    #[serde(default = "default_rock_variants")]
    pub rock_variants: usize,
    #[serde(default)]
    pub scatter: ScatterConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub lighting: LightingConfig,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_asset_path() -> PathBuf {
    PathBuf::from("assets/mjolnir.glb")
}
fn default_rock_variants() -> usize {
    4
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync: default_true(),
            seed: None,
            asset_path: default_asset_path(),
            pivot: [0.0; 3],
            centerpiece: CenterpieceConfig::default(),
            effects: EffectsConfig::default(),
            ground: GroundConfig::default(),
            rocks: RockConfig::default(),
            rock_variants: default_rock_variants(),
            scatter: ScatterConfig::default(),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Load config from `config.ron`. If the file is invalid, returns default config;
    /// if it is missing, also writes the defaults out as a starting point.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            let config = Self::default();
            config.save();
            log::info!("Wrote default config to {:?}", path);
            return config;
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match Self::from_ron(&data) {
                Ok(c) => match c.effects.validate() {
                    Ok(()) => return c,
                    Err(e) => log::warn!("Invalid effects in {:?}: {}, using defaults", path, e),
                },
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(e) => log::info!("No config at {:?} ({}), using defaults", path, e),
        }
        Self::default()
    }

    pub fn from_ron(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }

    pub fn pivot(&self) -> Vec3 {
        Vec3::from_array(self.pivot)
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}

/// How the loaded model is placed at the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterpieceConfig {
    /// Uniform scale applied to the model.
    pub scale: f32,
    pub yaw_degrees: f32,
    /// Added to the pivot after placement.
    pub offset: [f32; 3],
    /// Lift or sink the model so its lowest point touches the ground.
    pub rest_on_ground: bool,
}

impl Default for CenterpieceConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            yaw_degrees: 0.0,
            offset: [0.0; 3],
            rest_on_ground: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    pub fov_degrees: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Raises the look-at point above the pivot.
    pub target_height: f32,
    pub rotate_sensitivity: f32,
    pub zoom_sensitivity: f32,
    /// Idle spin; 0 disables.
    pub auto_rotate_degrees_per_second: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 30.0,
            yaw_degrees: 0.0,
            pitch_degrees: 20.0,
            fov_degrees: 75.0,
            min_distance: 3.0,
            max_distance: 120.0,
            target_height: 2.0,
            rotate_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
            auto_rotate_degrees_per_second: 3.0,
        }
    }
}

impl CameraConfig {
    /// Orbit camera looking at `pivot` (raised by `target_height`).
    pub fn build(&self, pivot: Vec3) -> OrbitCamera {
        let mut camera = OrbitCamera::default();
        camera.fov_degrees = self.fov_degrees;
        camera.min_distance = self.min_distance;
        camera.max_distance = self.max_distance;
        camera.rotate_sensitivity = self.rotate_sensitivity;
        camera.zoom_sensitivity = self.zoom_sensitivity;
        camera.auto_rotate_speed = self.auto_rotate_degrees_per_second.to_radians();
        camera.target = pivot + Vec3::Y * self.target_height;
        camera.set_distance(self.distance);
        camera.set_yaw_pitch(self.yaw_degrees.to_radians(), self.pitch_degrees.to_radians());
        camera
    }
}

/// Static lights and atmosphere. Colors are sRGB hex like `0x0b1020`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Clear color, also used as the fog color.
    pub background: u32,
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub sun_color: u32,
    pub sun_intensity: f32,
    /// Direction the sunlight travels.
    pub sun_direction: [f32; 3],
    /// Exponential-squared fog density (0 disables).
    pub fog_density: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            background: 0x0b1020,
            ambient_color: 0x404860,
            ambient_intensity: 0.6,
            sun_color: 0xaabbdd,
            sun_intensity: 0.5,
            sun_direction: [-0.4, -1.0, -0.3],
            fog_density: 0.012,
        }
    }
}
