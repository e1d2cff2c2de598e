//! AI policy: rigid, mechanical motion.
//!
//! - hover on y and z
//! - every `stream_stride`-th particle rides a sawtooth "data stream" along x
//!   and snaps back to its initial x when it reaches the stream plane
//! - repelled by the pointer
//! - rotation snaps in quarter turns, never interpolated
//! - fast ±`pulse_amplitude` scale flicker

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};

use super::{pulse, ColorKey, FrameTransform};
use crate::config::GroupConfig;
use crate::particle::ParticleDescriptor;

pub fn compute(d: &ParticleDescriptor, g: &GroupConfig, time: f32, pointer: Vec2) -> FrameTransform {
    let tp = d.personal_time(time);

    let mut position = d.initial_position;
    position.y += tp.sin() * g.hover_amplitude;
    position.z += (tp * 0.8).cos() * g.hover_amplitude;

    if d.index % g.stream_stride == 0 {
        position.x = stream_axis(d, g, time);
    }

    position.x -= pointer.x * g.pointer_strength;
    position.y -= pointer.y * g.pointer_strength;

    FrameTransform {
        position,
        rotation: Vec3::new(
            quarter_turns(time, g.rotation_rates.x),
            quarter_turns(time, g.rotation_rates.y),
            quarter_turns(time, g.rotation_rates.z),
        ),
        scale: pulse(d.size, tp, g.pulse_frequency, g.pulse_amplitude),
        color: ColorKey::alternate(d.index, g.color_stride),
    }
}

/// Stream-axis coordinate of a streaming particle.
///
/// The sawtooth wraps after `stream_period` units of travel, or sooner if
/// the stream plane is closer, so the particle snaps back to its initial x
/// exactly when it reaches the plane and starts moving again at once. A
/// particle that starts on or past the plane stays at its initial x.
pub fn stream_axis(d: &ParticleDescriptor, g: &GroupConfig, time: f32) -> f32 {
    let origin = d.initial_position.x;
    let room = (g.stream_plane - origin) * g.stream_direction;
    if room <= 0.0 {
        return origin;
    }

    let wrap = room.min(g.stream_period);
    let travel = (time * g.stream_speed * d.speed + d.phase).rem_euclid(wrap);
    origin + g.stream_direction * travel.min(wrap)
}

/// Angle in quarter turns, stepping once every `1 / rate` seconds.
#[inline]
fn quarter_turns(time: f32, rate: f32) -> f32 {
    (time * rate).floor() * FRAC_PI_2
}
