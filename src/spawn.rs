//! Seeded random source for the initial swarm layout.
//!
//! The scatter keeps its shape (a group-centered sphere, flattened in depth)
//! but is reproducible: the same seed always produces the same layout.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Random helpers used while building the particle store.
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context whose draws are fully determined by `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }

    /// Random unit vector, uniform over the sphere.
    pub fn random_direction(&mut self) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        // acos(2u - 1) keeps the poles from clumping
        let phi = (2.0 * self.rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();

        Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
    }

    /// Point at a random radius in `[radius_min, radius_max)` around `center`,
    /// with the z component scaled by `depth_scale`.
    pub fn flattened_scatter(
        &mut self,
        center: Vec3,
        radius_min: f32,
        radius_max: f32,
        depth_scale: f32,
    ) -> Vec3 {
        let radius = self.random_range(radius_min, radius_max);
        let offset = self.random_direction() * radius;
        center + Vec3::new(offset.x, offset.y, offset.z * depth_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = SpawnContext::seeded(42);
        let mut b = SpawnContext::seeded(42);
        for _ in 0..32 {
            assert_eq!(a.random(), b.random());
        }
    }

    #[test]
    fn test_different_seed_differs() {
        let mut a = SpawnContext::seeded(1);
        let mut b = SpawnContext::seeded(2);
        let draws_a: Vec<f32> = (0..8).map(|_| a.random()).collect();
        let draws_b: Vec<f32> = (0..8).map(|_| b.random()).collect();
        assert_ne!(draws_a, draws_b);
    }

    #[test]
    fn test_random_direction_is_unit() {
        let mut ctx = SpawnContext::seeded(7);
        for _ in 0..100 {
            let dir = ctx.random_direction();
            assert!((dir.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_flattened_scatter_bounds() {
        let mut ctx = SpawnContext::seeded(3);
        let center = Vec3::new(-12.0, 0.0, 0.0);
        for _ in 0..200 {
            let pos = ctx.flattened_scatter(center, 4.0, 10.0, 0.5);
            let offset = pos - center;
            // Flattening only shrinks the radius
            assert!(offset.length() < 10.0 + 1e-3);
            assert!(offset.z.abs() <= 5.0 + 1e-3);
            // Unflatten to recover the drawn radius
            let unflattened = Vec3::new(offset.x, offset.y, offset.z / 0.5);
            assert!(unflattened.length() >= 4.0 - 1e-3);
        }
    }
}
