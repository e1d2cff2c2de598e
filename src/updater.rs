//! Per-frame driver: motion policies in, instance buffer out.

use glam::{Vec2, Vec3};

use crate::config::SwarmConfig;
use crate::instance::{InstanceBuffer, ScratchTransform};
use crate::motion::{compute_transform, ColorKey};
use crate::particle::{Group, ParticleStore};

/// Counts from one completed pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Slots written this frame.
    pub written: usize,
    pub ai: usize,
    pub human: usize,
}

/// Applies the motion policies to every particle once per frame.
///
/// Owns only the scratch transform; the store and buffer are borrowed for
/// the duration of a pass.
#[derive(Debug, Default)]
pub struct FrameUpdater {
    scratch: ScratchTransform,
}

impl FrameUpdater {
    pub fn new() -> Self {
        Self {
            scratch: ScratchTransform::new(),
        }
    }

    /// Run one full pass in index order and mark the buffer dirty once.
    ///
    /// Returns `None` without touching anything when there is no buffer to
    /// write to (not yet allocated, or already released), when the buffer
    /// does not match the store, or when `config` fails
    /// [`SwarmConfig::validate`]. The policies index palettes and divide by
    /// strides that only validation guarantees.
    pub fn update(
        &mut self,
        store: &ParticleStore,
        config: &SwarmConfig,
        target: Option<&mut InstanceBuffer>,
        time: f32,
        pointer: Vec2,
    ) -> Option<FrameStats> {
        let buffer = target?;
        if let Err(e) = config.validate() {
            log::warn!("invalid configuration, skipping frame: {}", e);
            return None;
        }
        if buffer.len() != store.len() {
            log::warn!(
                "instance buffer has {} slots but store has {} particles; skipping frame",
                buffer.len(),
                store.len()
            );
            return None;
        }

        let shades = shade_table(config);
        let mut stats = FrameStats::default();

        for d in store.descriptors() {
            let group = config.group(d.group);
            let transform = compute_transform(d, group, time, pointer);
            let shade = shades[d.group as usize][transform.color.index()];

            self.scratch.stage(&transform, shade);
            buffer.write_slot(d.index as usize, &self.scratch);

            match d.group {
                Group::Ai => stats.ai += 1,
                Group::Human => stats.human += 1,
            }
        }
        stats.written = stats.ai + stats.human;

        buffer.mark_dirty();
        Some(stats)
    }
}

/// Resolved shades per group, indexed `[group][color key]`.
fn shade_table(config: &SwarmConfig) -> [[Vec3; ColorKey::COUNT]; Group::COUNT] {
    let resolve = |group: Group| {
        let g = config.group(group);
        [g.shade(ColorKey::Primary), g.shade(ColorKey::Secondary)]
    };
    [resolve(Group::Ai), resolve(Group::Human)]
}
