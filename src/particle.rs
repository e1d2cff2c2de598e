//! Particle store: the immutable per-particle descriptors.
//!
//! A particle never carries state across frames. Everything the motion
//! policies need is fixed here at mount time, and the per-frame transform
//! is a pure function of the descriptor, the clock and the pointer.

use glam::Vec3;

use crate::config::SwarmConfig;
use crate::error::ConfigError;
use crate::spawn::SpawnContext;

/// Personal speed multiplier range.
const SPEED_RANGE: (f32, f32) = (0.5, 1.5);
/// Phase offset range folded into personal time.
const PHASE_RANGE: (f32, f32) = (0.0, 100.0);

/// The two swarms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Group {
    Ai = 0,
    Human = 1,
}

impl Group {
    /// Number of groups; sizes the motion policy table.
    pub const COUNT: usize = 2;

    /// Lower-case name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Group::Ai => "ai",
            Group::Human => "human",
        }
    }
}

/// Immutable description of one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleDescriptor {
    pub group: Group,
    pub initial_position: Vec3,
    pub speed: f32,
    pub size: f32,
    pub phase: f32,
    /// Slot in the instance buffer.
    pub index: u32,
}

impl ParticleDescriptor {
    /// Time argument for this particle's oscillators.
    #[inline]
    pub fn personal_time(&self, time: f32) -> f32 {
        time * self.speed + self.phase
    }
}

/// Owns every descriptor for the lifetime of a mount.
///
/// Descriptors are stored in index order, so `descriptors()[i].index == i`.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    descriptors: Vec<ParticleDescriptor>,
    ai_count: usize,
}

impl ParticleStore {
    /// Build the store from a validated configuration.
    ///
    /// The first `config.ai_count()` particles are AI, the rest HUMAN.
    pub fn create(config: &SwarmConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let count = config.particle_count;
        let ai_count = config.ai_count().min(count);
        let mut ctx = SpawnContext::seeded(config.seed);

        let descriptors = (0..count)
            .map(|i| {
                let group = if i < ai_count { Group::Ai } else { Group::Human };
                let g = config.group(group);
                let initial_position =
                    ctx.flattened_scatter(g.center, g.radius_min, g.radius_max, g.depth_scale);

                ParticleDescriptor {
                    group,
                    initial_position,
                    speed: ctx.random_range(SPEED_RANGE.0, SPEED_RANGE.1),
                    size: ctx.random_range(g.size_min, g.size_max),
                    phase: ctx.random_range(PHASE_RANGE.0, PHASE_RANGE.1),
                    index: i as u32,
                }
            })
            .collect();

        log::debug!(
            "created {} particles ({} ai, {} human, seed {:#x})",
            count,
            ai_count,
            count - ai_count,
            config.seed
        );

        Ok(Self {
            descriptors,
            ai_count,
        })
    }

    /// All descriptors, in index order.
    #[inline]
    pub fn descriptors(&self) -> &[ParticleDescriptor] {
        &self.descriptors
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Number of AI particles; they occupy slots `0..ai_count`.
    #[inline]
    pub fn ai_count(&self) -> usize {
        self.ai_count
    }

    /// Number of HUMAN particles; they occupy slots `ai_count..len`.
    #[inline]
    pub fn human_count(&self) -> usize {
        self.descriptors.len() - self.ai_count
    }
}
