//! Engine configuration.
//!
//! All tuning lives in one [`SwarmConfig`] so tests can pin every constant.
//! The binary can also read it from a TOML file:
//!
//! ```toml
//! particle_count = 6000
//! seed = 7
//!
//! [scene.grid]
//! speed = 3.0
//! period = 2.0
//! half_extent = 40.0
//! height = -10.0
//! color = [0.1, 0.3, 0.5]
//! ```
//!
//! Top-level sections that are omitted keep their defaults. A group table
//! (`[ai]` or `[human]`) replaces that whole group definition.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::motion::ColorKey;
use crate::particle::Group;

/// Per-group layout, motion and palette parameters.
///
/// Both policies share this struct. Fields marked AI are read only by the AI
/// policy and fields marked HUMAN only by the HUMAN policy; the rest are read
/// by both. Every field is validated regardless of group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Center of the group's spherical scatter.
    pub center: Vec3,
    /// Inclusive lower bound of the scatter radius.
    pub radius_min: f32,
    /// Exclusive upper bound of the scatter radius.
    pub radius_max: f32,
    /// Depth (z) flattening applied to the scatter.
    pub depth_scale: f32,
    pub size_min: f32,
    pub size_max: f32,
    /// Shades indexed by [`ColorKey`]; needs at least [`ColorKey::COUNT`] entries.
    pub palette: Vec<[f32; 3]>,
    /// Amplitude of the hover (AI) or swirl (HUMAN) oscillation.
    pub hover_amplitude: f32,
    pub pulse_frequency: f32,
    /// Fractional scale pulse, `0.2` = ±20%.
    pub pulse_amplitude: f32,
    /// AI: quantization rate per axis (steps per second).
    /// HUMAN: angular speed per axis (radians per personal second).
    pub rotation_rates: Vec3,
    /// Pointer coupling magnitude in world units per NDC unit.
    pub pointer_strength: f32,
    /// Every `stream_stride`-th particle gets the data-stream (AI) or reach (HUMAN) motion.
    pub stream_stride: u32,
    /// AI sawtooth speed along the stream axis.
    pub stream_speed: f32,
    /// AI sawtooth wrap length.
    pub stream_period: f32,
    /// AI stream axis position beyond which a streaming particle snaps back.
    pub stream_plane: f32,
    /// AI sign of travel along the stream axis, exactly `1.0` or `-1.0`.
    pub stream_direction: f32,
    /// HUMAN reach displacement toward the convergence point.
    pub reach_distance: f32,
    /// Every `color_stride`-th particle takes the secondary shade.
    pub color_stride: u32,
}

impl GroupConfig {
    /// Cool, rigid "computational" swarm on the negative x side.
    pub fn ai() -> Self {
        Self {
            center: Vec3::new(-12.0, 0.0, 0.0),
            radius_min: 4.0,
            radius_max: 10.0,
            depth_scale: 0.5,
            size_min: 0.1,
            size_max: 0.3,
            palette: vec![[0.0, 0.85, 1.0], [0.15, 0.35, 1.0]],
            hover_amplitude: 0.5,
            pulse_frequency: 10.0,
            pulse_amplitude: 0.2,
            rotation_rates: Vec3::new(1.0, 0.5, 0.0),
            pointer_strength: 2.0,
            stream_stride: 10,
            stream_speed: 3.0,
            stream_period: 15.0,
            stream_plane: 0.0,
            stream_direction: 1.0,
            reach_distance: 0.0,
            color_stride: 3,
        }
    }

    /// Warm, breathing "organic" swarm on the positive x side.
    pub fn human() -> Self {
        Self {
            center: Vec3::new(12.0, 0.0, 0.0),
            radius_min: 4.0,
            radius_max: 10.0,
            depth_scale: 0.5,
            size_min: 0.1,
            size_max: 0.3,
            palette: vec![[1.0, 0.55, 0.1], [1.0, 0.2, 0.5]],
            hover_amplitude: 0.8,
            pulse_frequency: 2.0,
            pulse_amplitude: 0.3,
            rotation_rates: Vec3::new(0.2, 0.3, 0.1),
            pointer_strength: 3.0,
            stream_stride: 20,
            stream_speed: 0.0,
            stream_period: 1.0,
            stream_plane: 0.0,
            stream_direction: -1.0,
            reach_distance: 4.0,
            color_stride: 5,
        }
    }

    /// Resolve a color key against this group's palette.
    ///
    /// Validation guarantees the entry exists.
    #[inline]
    pub fn shade(&self, key: ColorKey) -> Vec3 {
        Vec3::from(self.palette[key.index()])
    }

    fn validate(&self, group: Group) -> Result<(), ConfigError> {
        let name = group.name();
        if !self.center.is_finite() {
            return Err(ConfigError::NonFinite {
                group: name,
                field: "center",
            });
        }
        if !self.depth_scale.is_finite() {
            return Err(ConfigError::NonFinite {
                group: name,
                field: "depth_scale",
            });
        }
        if !(self.radius_min >= 0.0
            && self.radius_max > self.radius_min
            && self.radius_max.is_finite())
        {
            return Err(ConfigError::RadiusRange {
                group: name,
                min: self.radius_min,
                max: self.radius_max,
            });
        }
        if !(self.size_min > 0.0 && self.size_max > self.size_min && self.size_max.is_finite())
        {
            return Err(ConfigError::SizeRange {
                group: name,
                min: self.size_min,
                max: self.size_max,
            });
        }
        if self.palette.len() < ColorKey::COUNT {
            return Err(ConfigError::Palette {
                group: name,
                expected: ColorKey::COUNT,
                actual: self.palette.len(),
            });
        }
        if self.stream_stride == 0 {
            return Err(ConfigError::ZeroStride {
                group: name,
                field: "stream_stride",
            });
        }
        if self.color_stride == 0 {
            return Err(ConfigError::ZeroStride {
                group: name,
                field: "color_stride",
            });
        }
        if !(self.stream_period > 0.0 && self.stream_period.is_finite()) {
            return Err(ConfigError::StreamPeriod {
                group: name,
                value: self.stream_period,
            });
        }
        if self.stream_direction.abs() != 1.0 {
            return Err(ConfigError::StreamDirection {
                group: name,
                value: self.stream_direction,
            });
        }
        Ok(())
    }
}

/// Scrolling grid floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Forward scroll speed in world units per second.
    pub speed: f32,
    /// Wrap length; one grid cell so the wrap is invisible.
    pub period: f32,
    /// Half the grid's side length.
    pub half_extent: f32,
    /// Floor height.
    pub height: f32,
    pub color: [f32; 3],
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            period: 2.0,
            half_extent: 40.0,
            height: -10.0,
            color: [0.05, 0.25, 0.4],
        }
    }
}

/// Central emblem at the convergence point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmblemConfig {
    /// Linear spin about y, radians per second.
    pub spin_rate: f32,
    pub wobble_frequency: f32,
    /// Peak tilt about x, radians.
    pub wobble_amplitude: f32,
    pub shell_radius: f32,
    pub core_radius: f32,
    pub ring_radius: f32,
    /// Light position in the emblem's local frame.
    pub light_offset: Vec3,
    pub light_color: [f32; 3],
    pub light_intensity: f32,
    pub shell_color: [f32; 3],
    pub core_color: [f32; 3],
    pub ring_color: [f32; 3],
}

impl Default for EmblemConfig {
    fn default() -> Self {
        Self {
            spin_rate: 0.5,
            wobble_frequency: 0.7,
            wobble_amplitude: 0.3,
            shell_radius: 2.0,
            core_radius: 0.8,
            ring_radius: 2.8,
            light_offset: Vec3::new(0.0, 0.0, 1.5),
            light_color: [0.8, 0.9, 1.0],
            light_intensity: 2.0,
            shell_color: [0.4, 0.8, 1.0],
            core_color: [1.0, 1.0, 1.0],
            ring_color: [0.9, 0.6, 1.0],
        }
    }
}

/// Linear distance fog; also the clear color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub color: [f32; 3],
    pub near: f32,
    pub far: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            color: [0.01, 0.01, 0.04],
            near: 20.0,
            far: 80.0,
        }
    }
}

/// Orbit camera around the convergence point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.12,
            distance: 32.0,
            fov_degrees: 60.0,
        }
    }
}

/// Everything composed around the particle layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub grid: GridConfig,
    pub emblem: EmblemConfig,
    pub fog: FogConfig,
    pub camera: CameraConfig,
    /// Ambient light term added to every lit surface.
    pub ambient: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            emblem: EmblemConfig::default(),
            fog: FogConfig::default(),
            camera: CameraConfig::default(),
            ambient: 0.25,
        }
    }
}

/// Host window parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Convergence".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    pub particle_count: usize,
    /// Fraction of particles assigned to the AI group (the first slots).
    pub split_ratio: f32,
    /// Seed for the initial scatter.
    pub seed: u64,
    pub ai: GroupConfig,
    pub human: GroupConfig,
    pub scene: SceneConfig,
    pub window: WindowConfig,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            particle_count: 4000,
            split_ratio: 0.5,
            seed: 0x5EED_C0DE,
            ai: GroupConfig::ai(),
            human: GroupConfig::human(),
            scene: SceneConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

impl SwarmConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the fraction of particles in the AI group.
    pub fn with_split_ratio(mut self, ratio: f32) -> Self {
        self.split_ratio = ratio;
        self
    }

    /// Set the scatter seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parameters for one group.
    #[inline]
    pub fn group(&self, group: Group) -> &GroupConfig {
        match group {
            Group::Ai => &self.ai,
            Group::Human => &self.human,
        }
    }

    /// Number of particles in the AI group; the rest are HUMAN.
    pub fn ai_count(&self) -> usize {
        (self.particle_count as f32 * self.split_ratio).round() as usize
    }

    /// Check every constraint the engine relies on at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NonPositiveCount(self.particle_count));
        }
        if !(0.0..=1.0).contains(&self.split_ratio) {
            return Err(ConfigError::SplitRatio(self.split_ratio));
        }
        self.ai.validate(Group::Ai)?;
        self.human.validate(Group::Human)?;
        if !(self.scene.grid.period > 0.0 && self.scene.grid.period.is_finite()) {
            return Err(ConfigError::GridPeriod(self.scene.grid.period));
        }
        Ok(())
    }

    /// Read a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        text.parse()
    }
}

impl std::str::FromStr for SwarmConfig {
    type Err = ConfigError;

    fn from_str(serialized: &str) -> Result<Self, Self::Err> {
        let config = toml::from_str(serialized)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SwarmConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particle_count, 4000);
        assert_eq!(config.ai_count(), 2000);
    }

    #[test]
    fn test_zero_particles_rejected() {
        let config = SwarmConfig::new().with_particle_count(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveCount(0))
        ));
    }

    #[test]
    fn test_short_palette_rejected() {
        let mut config = SwarmConfig::default();
        config.human.palette.truncate(1);
        match config.validate() {
            Err(ConfigError::Palette {
                group,
                expected,
                actual,
            }) => {
                assert_eq!(group, "human");
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("expected palette error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_range_rejected() {
        let mut config = SwarmConfig::default();
        config.ai.radius_max = f32::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RadiusRange { group: "ai", .. })
        ));

        let mut config = SwarmConfig::default();
        config.human.size_max = f32::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SizeRange { group: "human", .. })
        ));

        let mut config = SwarmConfig::default();
        config.ai.radius_min = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::RadiusRange { .. })));

        let mut config = SwarmConfig::default();
        config.ai.center.x = f32::NEG_INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "center", .. })
        ));

        let mut config = SwarmConfig::default();
        config.human.depth_scale = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "depth_scale", .. })
        ));

        let mut config = SwarmConfig::default();
        config.ai.stream_period = f32::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::StreamPeriod { .. })));

        let mut config = SwarmConfig::default();
        config.scene.grid.period = f32::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::GridPeriod(_))));
    }

    #[test]
    fn test_infinite_radius_from_toml_fails_before_spawning() {
        let mut text = toml::to_string(&SwarmConfig::default()).unwrap();
        text = text.replace("radius_max = 10.0", "radius_max = inf");
        let config: SwarmConfig = text.parse().unwrap();
        assert!(config.ai.radius_max.is_infinite());

        let result = crate::particle::ParticleStore::create(&config);
        assert!(matches!(result, Err(ConfigError::RadiusRange { .. })));
    }

    #[test]
    fn test_stream_direction_must_be_a_sign() {
        let mut config = SwarmConfig::default();
        config.ai.stream_direction = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StreamDirection { group: "ai", .. })
        ));

        config.ai.stream_direction = -1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_split_ratio_bounds() {
        assert!(SwarmConfig::new().with_split_ratio(1.5).validate().is_err());
        assert!(SwarmConfig::new().with_split_ratio(f32::NAN).validate().is_err());
        assert!(SwarmConfig::new().with_split_ratio(0.0).validate().is_ok());
    }

    #[test]
    fn test_zero_stride_rejected() {
        let mut config = SwarmConfig::default();
        config.ai.color_stride = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroStride { field: "color_stride", .. })
        ));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SwarmConfig = "particle_count = 100\nseed = 7\n\n[scene.grid]\nspeed = 5.0\n"
            .parse()
            .unwrap();
        assert_eq!(config.particle_count, 100);
        assert_eq!(config.seed, 7);
        assert_eq!(config.scene.grid.speed, 5.0);
        assert_eq!(config.scene.grid.period, GridConfig::default().period);
        assert_eq!(config.ai, GroupConfig::ai());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SwarmConfig::default().with_seed(99);
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: SwarmConfig = serialized.parse().unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let result: Result<SwarmConfig, _> = "particle_count = \"many\"".parse();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
