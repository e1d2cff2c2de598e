//! Integration tests for the engine lifecycle.
//!
//! These drive a full [`Engine`] over a [`HeadlessSurface`] and check the
//! observable contract: what lands in the instance buffer, how often it is
//! uploaded, and what happens after teardown.

use convergence::instance::ScratchTransform;
use convergence::prelude::*;

const COUNT: usize = 400;

fn start(config: SwarmConfig) -> Engine<HeadlessSurface> {
    Engine::start(HeadlessSurface::new(), config).unwrap()
}

fn translation(engine: &Engine<HeadlessSurface>, slot: usize) -> Vec3 {
    engine
        .instances()
        .and_then(|buffer| buffer.matrix(slot))
        .map(|m| m.w_axis.truncate())
        .unwrap()
}

// ============================================================================
// Instance buffer contents
// ============================================================================

#[test]
fn test_every_slot_matches_its_policy() {
    let config = SwarmConfig::new().with_particle_count(COUNT);
    let mut engine = start(config.clone());
    let time = 2.75;
    engine.frame(time).unwrap();

    let store = engine.store().unwrap();
    let buffer = engine.instances().unwrap();
    let mut scratch = ScratchTransform::new();

    for d in store.descriptors() {
        let group = config.group(d.group);
        let transform = compute_transform(d, group, time, Vec2::ZERO);
        scratch.stage(&transform, group.shade(transform.color));

        let slot = d.index as usize;
        assert_eq!(buffer.matrices()[slot], scratch.matrix().to_cols_array_2d());
        assert_eq!(buffer.colors()[slot], scratch.color().to_array());
    }
}

#[test]
fn test_slot_indices_are_a_bijection() {
    let engine = start(SwarmConfig::new().with_particle_count(COUNT));
    let store = engine.store().unwrap();

    let mut seen = vec![false; store.len()];
    for d in store.descriptors() {
        let slot = d.index as usize;
        assert!(!seen[slot], "slot {} claimed twice", slot);
        seen[slot] = true;
    }
    assert!(seen.iter().all(|&s| s));
    assert_eq!(engine.instances().unwrap().len(), store.len());
}

#[test]
fn test_ai_slots_lead_the_buffer() {
    let engine = start(
        SwarmConfig::new()
            .with_particle_count(101)
            .with_split_ratio(0.5),
    );
    let store = engine.store().unwrap();
    assert_eq!(store.ai_count(), 51);
    assert_eq!(engine.surface().ai_count, 51);

    for d in store.descriptors() {
        let expected = if (d.index as usize) < 51 {
            Group::Ai
        } else {
            Group::Human
        };
        assert_eq!(d.group, expected);
    }
}

#[test]
fn test_colors_follow_group_palettes() {
    let config = SwarmConfig::new().with_particle_count(COUNT);
    let mut engine = start(config.clone());
    engine.frame(1.0).unwrap();

    let store = engine.store().unwrap();
    let colors = engine.instances().unwrap().colors();
    for d in store.descriptors() {
        let group = config.group(d.group);
        let key = ColorKey::alternate(d.index, group.color_stride);
        let rgb = group.shade(key);
        assert_eq!(colors[d.index as usize], [rgb.x, rgb.y, rgb.z, 1.0]);
    }
}

// ============================================================================
// Pointer coupling
// ============================================================================

#[test]
fn test_pointer_pushes_swarms_in_opposite_directions() {
    let config = SwarmConfig::new().with_particle_count(COUNT);
    let time = 3.0;

    let mut still = start(config.clone());
    still.frame(time).unwrap();

    let mut moved = start(config.clone());
    moved.set_pointer(Vec2::new(0.5, -0.25));
    moved.frame(time).unwrap();

    let ai = &config.ai;
    let human = &config.human;
    for d in still.store().unwrap().descriptors() {
        let slot = d.index as usize;
        let delta = translation(&moved, slot) - translation(&still, slot);
        let expected = match d.group {
            Group::Ai => Vec2::new(-0.5, 0.25) * ai.pointer_strength,
            Group::Human => Vec2::new(0.5, -0.25) * human.pointer_strength,
        };
        assert!(
            (delta.truncate() - expected).length() < 1e-4,
            "slot {} moved {:?}, expected {:?}",
            slot,
            delta,
            expected
        );
        assert!(delta.z.abs() < 1e-5);
    }
}

#[test]
fn test_centered_pointer_adds_no_displacement() {
    let config = SwarmConfig::new().with_particle_count(COUNT);
    let time = 0.8;

    let mut engine = start(config.clone());
    engine.set_pointer(Vec2::ZERO);
    engine.frame(time).unwrap();

    for d in engine.store().unwrap().descriptors() {
        let expected = compute_transform(d, config.group(d.group), time, Vec2::ZERO).position;
        let actual = translation(&engine, d.index as usize);
        assert!((actual - expected).length() < 1e-4);
    }
}

// ============================================================================
// Data streams
// ============================================================================

#[test]
fn test_stream_particles_stay_behind_the_plane() {
    let config = SwarmConfig::new().with_particle_count(COUNT);
    let plane = config.ai.stream_plane;
    let stride = config.ai.stream_stride;
    let mut engine = start(config);

    for frame in 0..240 {
        let time = frame as f32 / 30.0;
        engine.frame(time).unwrap();

        let store = engine.store().unwrap();
        for d in store.descriptors() {
            if d.group != Group::Ai || d.index % stride != 0 {
                continue;
            }
            let x = translation(&engine, d.index as usize).x;
            if d.initial_position.x <= plane {
                assert!(x <= plane + 1e-4, "stream slot {} crossed to x = {}", d.index, x);
            }
        }
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_buffer_size_constant_across_session() {
    let mut engine = start(SwarmConfig::new().with_particle_count(COUNT));

    for frame in 1..=120 {
        let status = engine.frame(frame as f32 / 60.0).unwrap();
        match status {
            FrameStatus::Rendered(stats) => {
                assert_eq!(stats.written, COUNT);
                assert_eq!(stats.ai + stats.human, COUNT);
            }
            other => panic!("unexpected frame status {:?}", other),
        }
        assert_eq!(engine.instances().unwrap().len(), COUNT);
    }

    let surface = engine.surface();
    assert_eq!(surface.matrix_uploads, 120);
    assert_eq!(surface.color_uploads, 120);
    assert_eq!(surface.last_matrices.len(), COUNT * 64);
}

#[test]
fn test_teardown_mid_session() {
    let mut engine = start(SwarmConfig::new().with_particle_count(COUNT));
    for frame in 0..10 {
        engine.frame(frame as f32 * 0.1).unwrap();
    }

    engine.stop();
    assert!(!engine.is_running());
    assert!(engine.surface().released);
    assert!(engine.instances().is_none());
    assert!(engine.store().is_none());

    for frame in 10..20 {
        assert_eq!(engine.frame(frame as f32 * 0.1).unwrap(), FrameStatus::Stopped);
    }
    assert_eq!(engine.surface().matrix_uploads, 10);
    assert_eq!(engine.surface().presents, 10);
    assert_eq!(engine.surface().ignored_uploads, 0);
}

#[test]
fn test_same_seed_same_frames() {
    let config = SwarmConfig::new().with_particle_count(COUNT).with_seed(42);

    let mut a = start(config.clone());
    let mut b = start(config);
    for time in [0.0, 0.5, 7.25, 100.0] {
        a.frame(time).unwrap();
        b.frame(time).unwrap();
        assert_eq!(a.surface().last_matrices, b.surface().last_matrices);
    }
}

#[test]
fn test_frames_depend_only_on_time() {
    let mut engine = start(SwarmConfig::new().with_particle_count(COUNT));

    engine.frame(5.0).unwrap();
    let first = engine.surface().last_matrices.clone();

    // Visit other times, then come back
    engine.frame(9.0).unwrap();
    engine.frame(1.0).unwrap();
    engine.frame(5.0).unwrap();
    assert_eq!(engine.surface().last_matrices, first);
}

#[test]
fn test_scene_shares_the_particle_clock() {
    let mut engine = start(SwarmConfig::new().with_particle_count(16));
    engine.frame(12.5).unwrap();
    assert_eq!(engine.surface().last_scene_time, Some(12.5));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_engine_from_toml() {
    let config: SwarmConfig = r#"
        particle_count = 10
        split_ratio = 0.3
        seed = 7

        [scene.grid]
        speed = 4.0
    "#
    .parse()
    .unwrap();

    let engine = start(config);
    assert_eq!(engine.surface().capacity, Some(10));
    assert_eq!(engine.surface().ai_count, 3);
    assert_eq!(engine.config().scene.grid.speed, 4.0);
}

#[test]
fn test_invalid_config_never_allocates() {
    let mut config = SwarmConfig::new();
    config.human.palette.truncate(1);

    let result = Engine::start(HeadlessSurface::new(), config);
    assert!(matches!(
        result,
        Err(EngineError::Config(ConfigError::Palette { .. }))
    ));
}
