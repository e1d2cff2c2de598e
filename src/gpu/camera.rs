//! Orbit camera looking at the convergence point.

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;
use crate::motion::CONVERGENCE_POINT;

const NEAR: f32 = 0.1;
const FAR: f32 = 200.0;

/// Orbit camera for viewing the swarms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Camera {
    /// Create a camera from its configuration, aimed at the convergence point.
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            yaw: config.yaw,
            pitch: config.pitch,
            distance: config.distance,
            target: CONVERGENCE_POINT,
            fov_degrees: config.fov_degrees,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Combined projection and view for a surface of the given aspect ratio.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, NEAR, FAR);
        proj * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}
