//! Scene configuration.
//!
//! Every tunable of the city lives here with its default value. The defaults
//! reproduce the reference look; `SceneConfig::from_env` lets a caller pin the
//! random seed without recompiling.

use anyhow::Context as _;

/// Environment variable holding a `u64` seed for reproducible cities.
pub const SEED_ENV: &str = "NEON_CITY_SEED";

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// `None` draws a fresh seed at startup (it is logged so a run can be repeated).
    pub seed: Option<u64>,
    pub city: CityConfig,
    pub camera: CameraConfig,
    pub bloom: BloomConfig,
    pub light: LightConfig,
    pub clear_colour: wgpu::Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: None,
            city: CityConfig::default(),
            camera: CameraConfig::default(),
            bloom: BloomConfig::default(),
            light: LightConfig::default(),
            clear_colour: wgpu::Color::BLACK,
        }
    }
}

impl SceneConfig {
    /// Defaults overlaid with values found in the process environment.
    ///
    /// A malformed seed is reported and ignored rather than aborting startup.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        match std::env::var(SEED_ENV) {
            Ok(raw) => match parse_seed(&raw) {
                Ok(seed) => config.seed = Some(seed),
                Err(e) => log::warn!("ignoring {}: {:#}", SEED_ENV, e),
            },
            Err(_) => (),
        }
        config
    }
}

pub fn parse_seed(raw: &str) -> anyhow::Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("`{}` is not a valid u64 seed", raw))
}

/// Layout of the building grid and the ring heuristic used at the call sites.
#[derive(Clone, Debug, PartialEq)]
pub struct CityConfig {
    /// Buildings are placed from `-extent` to `extent` inclusive on both axes.
    pub extent: i32,
    pub spacing: i32,
    pub max_height: f32,
    pub max_rings: u32,
    pub ground_size: f32,
    pub sky_radius: f32,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            extent: 120,
            spacing: 10,
            max_height: 25.0,
            max_rings: 15,
            ground_size: 400.0,
            sky_radius: 200.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
    /// Fraction of the pending orbit delta applied per 60 Hz frame.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [50.0, 80.0, 50.0],
            target: [0.0, 0.0, 0.0],
            fovy: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 1.0,
            max_distance: 500.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BloomConfig {
    pub strength: f32,
    pub radius: f32,
    /// Luminance above which pixels start to glow.
    pub threshold: f32,
    pub smooth_width: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            strength: 1.5,
            radius: 0.4,
            threshold: 0.85,
            smooth_width: 0.01,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightConfig {
    pub ambient_colour: [f32; 3],
    pub ambient_intensity: f32,
    pub directional_colour: [f32; 3],
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            ambient_colour: [1.0, 1.0, 1.0],
            ambient_intensity: 0.9,
            directional_colour: [1.0, 1.0, 1.0],
            directional_intensity: 0.5,
            directional_position: [50.0, 50.0, 10.0],
        }
    }
}
