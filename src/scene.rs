//! Scene environment composed around the particle layer.
//!
//! The grid floor, the emblem and its light are driven by the same clock as
//! the particles. Everything here is a pure function of elapsed time, like
//! the motion policies.

use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::config::{EmblemConfig, FogConfig, GridConfig, SceneConfig};
use crate::gpu::camera::Camera;
use crate::motion::CONVERGENCE_POINT;

/// Height of the translucent plane hiding the grid's far edge.
const MASK_HEIGHT: f32 = 30.0;
/// Opacity of that plane.
pub const MASK_ALPHA: f32 = 0.9;

/// Infinite-seeming floor that scrolls toward the viewer.
#[derive(Debug, Clone, Copy)]
pub struct GridFloor {
    config: GridConfig,
}

impl GridFloor {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    /// Scroll offset along z, always in `[0, period)`.
    #[inline]
    pub fn offset(&self, time: f32) -> f32 {
        let offset = (time * self.config.speed).rem_euclid(self.config.period);
        // rem_euclid can round up to exactly `period` for tiny negative inputs
        if offset >= self.config.period {
            0.0
        } else {
            offset
        }
    }

    /// Placement of the mask plane at the far edge (a unit quad in the XY plane).
    pub fn mask_matrix(&self) -> Mat4 {
        let c = &self.config;
        Mat4::from_scale_rotation_translation(
            Vec3::new(c.half_extent * 2.0, MASK_HEIGHT, 1.0),
            Quat::IDENTITY,
            Vec3::new(0.0, c.height + MASK_HEIGHT * 0.5, -c.half_extent),
        )
    }

    #[inline]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }
}

/// The composite at the convergence point.
#[derive(Debug, Clone, Copy)]
pub struct Emblem {
    config: EmblemConfig,
}

impl Emblem {
    pub fn new(config: EmblemConfig) -> Self {
        Self { config }
    }

    /// Euler rotation: linear spin about y, sinusoidal tilt about x.
    #[inline]
    pub fn rotation(&self, time: f32) -> Vec3 {
        let c = &self.config;
        Vec3::new(
            (time * c.wobble_frequency).sin() * c.wobble_amplitude,
            time * c.spin_rate,
            0.0,
        )
    }

    fn orientation(&self, time: f32) -> Quat {
        let r = self.rotation(time);
        Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z)
    }

    /// World matrix of the emblem root.
    pub fn matrix(&self, time: f32) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(time), CONVERGENCE_POINT)
    }

    /// The two crossed rings, each a unit circle in its local XZ plane.
    pub fn ring_matrices(&self, time: f32) -> [Mat4; 2] {
        let root = self.matrix(time);
        let scale = Mat4::from_scale(Vec3::splat(self.config.ring_radius));
        [
            root * Mat4::from_rotation_x(FRAC_PI_2) * scale,
            root * Mat4::from_rotation_y(FRAC_PI_2) * Mat4::from_rotation_x(FRAC_PI_2) * scale,
        ]
    }

    /// Wireframe shell placement (unit mesh scaled to the shell radius).
    pub fn shell_matrix(&self, time: f32) -> Mat4 {
        self.matrix(time) * Mat4::from_scale(Vec3::splat(self.config.shell_radius))
    }

    /// Solid core placement.
    pub fn core_matrix(&self, time: f32) -> Mat4 {
        self.matrix(time) * Mat4::from_scale(Vec3::splat(self.config.core_radius))
    }

    /// The attached point light rotates with the emblem.
    pub fn light_position(&self, time: f32) -> Vec3 {
        CONVERGENCE_POINT + self.orientation(time) * self.config.light_offset
    }

    /// Pulsing light intensity, between 0.5x and 1.5x the configured value.
    pub fn light_intensity(&self, time: f32) -> f32 {
        self.config.light_intensity * (1.0 + 0.5 * (time * 2.0).sin())
    }

    #[inline]
    pub fn config(&self) -> &EmblemConfig {
        &self.config
    }
}

/// Everything the renderer needs about the environment for one frame.
#[derive(Debug, Clone, Copy)]
pub struct SceneFrame {
    pub time: f32,
    pub grid_offset: f32,
    pub grid: GridConfig,
    pub mask: Mat4,
    pub shell: Mat4,
    pub core: Mat4,
    pub rings: [Mat4; 2],
    pub emblem: EmblemConfig,
    pub light_position: Vec3,
    pub light_intensity: f32,
    pub fog: FogConfig,
    pub ambient: f32,
    pub camera: Camera,
}

/// Owns the environment's state: its configuration and the camera.
#[derive(Debug, Clone)]
pub struct Scene {
    grid: GridFloor,
    emblem: Emblem,
    fog: FogConfig,
    ambient: f32,
    camera: Camera,
}

impl Scene {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            grid: GridFloor::new(config.grid),
            emblem: Emblem::new(config.emblem),
            fog: config.fog,
            ambient: config.ambient,
            camera: Camera::new(&config.camera),
        }
    }

    /// Evaluate the environment at `time`.
    pub fn frame(&self, time: f32) -> SceneFrame {
        SceneFrame {
            time,
            grid_offset: self.grid.offset(time),
            grid: *self.grid.config(),
            mask: self.grid.mask_matrix(),
            shell: self.emblem.shell_matrix(time),
            core: self.emblem.core_matrix(time),
            rings: self.emblem.ring_matrices(time),
            emblem: *self.emblem.config(),
            light_position: self.emblem.light_position(time),
            light_intensity: self.emblem.light_intensity(time),
            fog: self.fog,
            ambient: self.ambient,
            camera: self.camera,
        }
    }

    #[inline]
    pub fn grid(&self) -> &GridFloor {
        &self.grid
    }

    #[inline]
    pub fn emblem(&self) -> &Emblem {
        &self.emblem
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }
}
