//! Motion policies.
//!
//! Each group has one policy: a pure function from
//! (descriptor, group parameters, elapsed time, pointer offset) to a
//! [`FrameTransform`]. Identical inputs always produce bit-identical output,
//! so animation state is a function of wall-clock time alone and a frame can
//! be recomputed from scratch at any point.
//!
//! Policies are selected through [`POLICIES`], a static table indexed by
//! [`Group`], rather than through trait objects.

pub mod ai;
pub mod human;

use glam::{Vec2, Vec3};

use crate::config::GroupConfig;
use crate::particle::{Group, ParticleDescriptor};

/// Where both swarms converge; the emblem sits here.
pub const CONVERGENCE_POINT: Vec3 = Vec3::ZERO;

/// Palette slot selected by a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ColorKey {
    Primary = 0,
    Secondary = 1,
}

impl ColorKey {
    /// Number of palette entries a group must provide.
    pub const COUNT: usize = 2;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// `Secondary` for every `stride`-th index, `Primary` otherwise.
    #[inline]
    pub fn alternate(index: u32, stride: u32) -> Self {
        if index % stride == 0 {
            ColorKey::Secondary
        } else {
            ColorKey::Primary
        }
    }
}

/// One particle's pose and shade for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,
    /// Uniform scale.
    pub scale: f32,
    pub color: ColorKey,
}

/// Signature shared by every policy.
pub type MotionFn = fn(&ParticleDescriptor, &GroupConfig, f32, Vec2) -> FrameTransform;

/// Policy table indexed by `Group as usize`.
pub const POLICIES: [MotionFn; Group::COUNT] = [ai::compute, human::compute];

/// Compute a particle's transform with its group's policy.
#[inline]
pub fn compute_transform(
    descriptor: &ParticleDescriptor,
    group: &GroupConfig,
    time: f32,
    pointer: Vec2,
) -> FrameTransform {
    POLICIES[descriptor.group as usize](descriptor, group, time, pointer)
}

/// Scale pulse shared by both policies: `size * (1 + amplitude * sin(tp * frequency))`.
#[inline]
pub(crate) fn pulse(size: f32, personal_time: f32, frequency: f32, amplitude: f32) -> f32 {
    size * (1.0 + amplitude * (personal_time * frequency).sin())
}
