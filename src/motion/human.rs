//! HUMAN policy: organic, breathing motion.
//!
//! Smooth three-axis swirl, a periodic reach toward the convergence point for
//! every `stream_stride`-th particle, attraction to the pointer, continuous
//! tumbling and a slow scale pulse.

use glam::{Vec2, Vec3};

use super::{pulse, ColorKey, FrameTransform, CONVERGENCE_POINT};
use crate::config::GroupConfig;
use crate::particle::ParticleDescriptor;

pub fn compute(d: &ParticleDescriptor, g: &GroupConfig, time: f32, pointer: Vec2) -> FrameTransform {
    let tp = d.personal_time(time);

    let swirl = Vec3::new((tp * 0.5).sin(), (tp * 0.3).cos(), (tp * 0.7).sin()) * g.hover_amplitude;
    let mut position = d.initial_position + swirl;

    if d.index % g.stream_stride == 0 {
        position += reach(d, g, time);
    }

    position.x += pointer.x * g.pointer_strength;
    position.y += pointer.y * g.pointer_strength;

    FrameTransform {
        position,
        rotation: g.rotation_rates * tp,
        scale: pulse(d.size, tp, g.pulse_frequency, g.pulse_amplitude),
        color: ColorKey::alternate(d.index, g.color_stride),
    }
}

/// Displacement toward the convergence point, proportional to `sin(time)`.
pub fn reach(d: &ParticleDescriptor, g: &GroupConfig, time: f32) -> Vec3 {
    let toward = (CONVERGENCE_POINT - d.initial_position).normalize_or_zero();
    toward * g.reach_distance * time.sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Group;
    use std::f32::consts::FRAC_PI_2;

    fn descriptor(index: u32, initial: Vec3) -> ParticleDescriptor {
        ParticleDescriptor {
            group: Group::Human,
            initial_position: initial,
            speed: 1.0,
            size: 0.2,
            phase: 0.0,
            index,
        }
    }

    #[test]
    fn test_pointer_attracts() {
        let g = GroupConfig::human();
        let d = descriptor(3, Vec3::new(12.0, 1.0, 0.0));
        let rest = compute(&d, &g, 0.5, Vec2::ZERO).position;
        let pulled = compute(&d, &g, 0.5, Vec2::new(-1.0, 0.25)).position;
        assert!((pulled.x - (rest.x - g.pointer_strength)).abs() < 1e-5);
        assert!((pulled.y - (rest.y + 0.25 * g.pointer_strength)).abs() < 1e-5);
        assert_eq!(pulled.z, rest.z);
    }

    #[test]
    fn test_reach_moves_toward_center() {
        let g = GroupConfig::human();
        let d = descriptor(40, Vec3::new(12.0, 0.0, 0.0));

        // sin(pi/2) = 1: full reach toward the origin along -x
        let r = reach(&d, &g, FRAC_PI_2);
        assert!((r.x + g.reach_distance).abs() < 1e-5);
        assert!(r.y.abs() < 1e-6 && r.z.abs() < 1e-6);

        assert_eq!(reach(&d, &g, 0.0), Vec3::ZERO);
    }

    #[test]
    fn test_reach_only_on_stride() {
        let g = GroupConfig::human();
        let init = Vec3::new(10.0, 2.0, -1.0);
        let time = FRAC_PI_2;

        let reaching = compute(&descriptor(40, init), &g, time, Vec2::ZERO).position;
        let plain = compute(&descriptor(41, init), &g, time, Vec2::ZERO).position;
        let expected = plain + reach(&descriptor(40, init), &g, time);
        assert!((reaching - expected).length() < 1e-5);
    }

    #[test]
    fn test_reach_at_convergence_point_is_zero() {
        let g = GroupConfig::human();
        let d = descriptor(0, CONVERGENCE_POINT);
        assert_eq!(reach(&d, &g, 1.0), Vec3::ZERO);
    }

    #[test]
    fn test_rotation_is_continuous() {
        let g = GroupConfig::human();
        let d = descriptor(1, Vec3::new(12.0, 0.0, 0.0));
        let a = compute(&d, &g, 1.0, Vec2::ZERO).rotation;
        let b = compute(&d, &g, 1.001, Vec2::ZERO).rotation;
        let delta = b - a;
        // Advances a little on every axis, by rate * dt
        assert!(delta.x > 0.0 && delta.y > 0.0 && delta.z > 0.0);
        assert!((delta - g.rotation_rates * 0.001).length() < 1e-4);
    }

    #[test]
    fn test_swirl_stays_near_initial() {
        let g = GroupConfig::human();
        let init = Vec3::new(15.0, -3.0, 2.0);
        let d = descriptor(1, init);
        let bound = g.hover_amplitude * 3.0_f32.sqrt() + 1e-4;
        for i in 0..400 {
            let p = compute(&d, &g, i as f32 * 0.05, Vec2::ZERO).position;
            assert!((p - init).length() <= bound);
        }
    }

    #[test]
    fn test_breathing_pulse_bounds() {
        let g = GroupConfig::human();
        let d = descriptor(1, Vec3::ZERO);
        for i in 0..300 {
            let s = compute(&d, &g, i as f32 * 0.02, Vec2::ZERO).scale;
            assert!(s >= d.size * 0.7 - 1e-6 && s <= d.size * 1.3 + 1e-6);
        }
    }
}
