//! Mount/unmount lifecycle.
//!
//! The engine has exactly two states. While running, every call to
//! [`Engine::frame`] performs one full pass: pointer snapshot, motion
//! policies into the instance buffer, one upload, one present. After
//! [`Engine::stop`] the buffer is gone, the pointer is detached and `frame`
//! is a no-op.

use glam::Vec2;
use winit::event::WindowEvent;

use crate::config::SwarmConfig;
use crate::error::EngineError;
use crate::instance::InstanceBuffer;
use crate::particle::ParticleStore;
use crate::pointer::PointerTracker;
use crate::scene::Scene;
use crate::surface::RenderSurface;
use crate::updater::{FrameStats, FrameUpdater};

/// Outcome of one call to [`Engine::frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A full pass ran and the frame was presented.
    Rendered(FrameStats),
    /// Still running, but the updater declined the pass. Nothing was
    /// uploaded or presented.
    Skipped,
    /// The engine is stopped; nothing was touched.
    Stopped,
}

/// Everything that exists only while mounted.
struct Running {
    store: ParticleStore,
    buffer: InstanceBuffer,
    updater: FrameUpdater,
    scene: Scene,
    pointer: PointerTracker,
}

enum EngineState {
    Running(Box<Running>),
    Stopped,
}

/// The particle background, mounted on a render surface.
pub struct Engine<S: RenderSurface> {
    surface: S,
    config: SwarmConfig,
    state: EngineState,
}

impl<S: RenderSurface> Engine<S> {
    /// Validate `config`, build the swarm and attach it to `surface`.
    pub fn start(mut surface: S, config: SwarmConfig) -> Result<Self, EngineError> {
        let store = ParticleStore::create(&config)?;
        let buffer = InstanceBuffer::new(store.len());
        surface.allocate(buffer.len(), store.ai_count());

        log::info!(
            "engine started: {} particles ({} ai / {} human)",
            store.len(),
            store.ai_count(),
            store.human_count()
        );

        let running = Running {
            scene: Scene::new(&config.scene),
            store,
            buffer,
            updater: FrameUpdater::new(),
            pointer: PointerTracker::new(),
        };

        Ok(Self {
            surface,
            config,
            state: EngineState::Running(Box::new(running)),
        })
    }

    /// Render-loop callback. `elapsed` is seconds since mount.
    pub fn frame(&mut self, elapsed: f32) -> Result<FrameStatus, EngineError> {
        let Self {
            surface,
            config,
            state,
        } = self;

        let running = match state {
            EngineState::Running(running) => running,
            EngineState::Stopped => return Ok(FrameStatus::Stopped),
        };

        let pointer = running.pointer.snapshot();
        let stats = match running.updater.update(
            &running.store,
            config,
            Some(&mut running.buffer),
            elapsed,
            pointer,
        ) {
            Some(stats) => stats,
            None => return Ok(FrameStatus::Skipped),
        };

        surface.upload(&running.buffer);
        running.buffer.clear_dirty();

        let scene = running.scene.frame(elapsed);
        surface.present(&scene)?;

        Ok(FrameStatus::Rendered(stats))
    }

    /// Detach the pointer, release the buffer and stop. Idempotent.
    pub fn stop(&mut self) {
        if let EngineState::Running(mut running) =
            std::mem::replace(&mut self.state, EngineState::Stopped)
        {
            running.pointer.detach();
            self.surface.release();
            log::info!("engine stopped");
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.state, EngineState::Running(_))
    }

    /// Set the pointer offset directly (NDC). Ignored when stopped.
    pub fn set_pointer(&mut self, ndc: Vec2) {
        if let EngineState::Running(running) = &mut self.state {
            running.pointer.set_ndc(ndc);
        }
    }

    /// Current pointer offset, or `None` when stopped.
    pub fn pointer(&self) -> Option<Vec2> {
        match &self.state {
            EngineState::Running(running) => Some(running.pointer.snapshot()),
            EngineState::Stopped => None,
        }
    }

    /// Feed a window event to the pointer tracker and surface.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        if let EngineState::Running(running) = &mut self.state {
            running.pointer.handle_event(event);
            if let WindowEvent::Resized(size) = event {
                self.surface.resize(size.width, size.height);
            }
        }
    }

    /// Resize the surface and the pointer's reference frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let EngineState::Running(running) = &mut self.state {
            running.pointer.set_window_size(width, height);
            self.surface.resize(width, height);
        }
    }

    #[inline]
    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    #[inline]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[inline]
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Particle store, or `None` when stopped.
    pub fn store(&self) -> Option<&ParticleStore> {
        match &self.state {
            EngineState::Running(running) => Some(&running.store),
            EngineState::Stopped => None,
        }
    }

    /// Instance buffer, or `None` once released.
    pub fn instances(&self) -> Option<&InstanceBuffer> {
        match &self.state {
            EngineState::Running(running) => Some(&running.buffer),
            EngineState::Stopped => None,
        }
    }

    /// Scene environment, or `None` when stopped.
    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        match &mut self.state {
            EngineState::Running(running) => Some(&mut running.scene),
            EngineState::Stopped => None,
        }
    }
}

impl<S: RenderSurface> Drop for Engine<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::surface::HeadlessSurface;

    fn start(count: usize) -> Engine<HeadlessSurface> {
        Engine::start(
            HeadlessSurface::new(),
            SwarmConfig::new().with_particle_count(count),
        )
        .unwrap()
    }

    #[test]
    fn test_start_allocates_surface() {
        let engine = start(100);
        assert!(engine.is_running());
        assert_eq!(engine.surface().capacity, Some(100));
        assert_eq!(engine.surface().ai_count, 50);
        assert_eq!(engine.instances().unwrap().len(), 100);
    }

    #[test]
    fn test_start_rejects_zero_particles() {
        let result = Engine::start(
            HeadlessSurface::new(),
            SwarmConfig::new().with_particle_count(0),
        );
        assert!(matches!(
            result,
            Err(EngineError::Config(ConfigError::NonPositiveCount(0)))
        ));
    }

    #[test]
    fn test_frame_uploads_each_channel_once() {
        let mut engine = start(64);
        for i in 0..5 {
            let status = engine.frame(i as f32 / 60.0).unwrap();
            assert!(matches!(status, FrameStatus::Rendered(stats) if stats.written == 64));
        }
        let surface = engine.surface();
        assert_eq!(surface.matrix_uploads, 5);
        assert_eq!(surface.color_uploads, 5);
        assert_eq!(surface.presents, 5);
        assert_eq!(engine.instances().unwrap().matrix_version(), 5);
        assert!(!engine.instances().unwrap().is_matrix_dirty());
    }

    #[test]
    fn test_frame_after_stop_is_noop() {
        let mut engine = start(32);
        engine.frame(0.1).unwrap();
        engine.stop();

        assert!(!engine.is_running());
        assert!(engine.surface().released);
        assert!(engine.instances().is_none());

        let uploads = engine.surface().matrix_uploads;
        assert_eq!(engine.frame(0.2).unwrap(), FrameStatus::Stopped);
        assert_eq!(engine.surface().matrix_uploads, uploads);
        assert_eq!(engine.surface().presents, 1);

        // Stopping twice is harmless
        engine.stop();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_mismatched_buffer_skips_without_stopping() {
        let mut engine = start(16);
        if let EngineState::Running(running) = &mut engine.state {
            running.buffer = InstanceBuffer::new(15);
        }

        assert_eq!(engine.frame(0.5).unwrap(), FrameStatus::Skipped);
        assert!(engine.is_running());
        assert_eq!(engine.surface().matrix_uploads, 0);
        assert_eq!(engine.surface().presents, 0);
        assert_eq!(engine.instances().unwrap().matrix_version(), 0);
    }

    #[test]
    fn test_pointer_ignored_after_stop() {
        let mut engine = start(8);
        engine.set_pointer(Vec2::new(0.5, 0.5));
        assert_eq!(engine.pointer(), Some(Vec2::new(0.5, 0.5)));
        engine.stop();
        engine.set_pointer(Vec2::new(-0.5, 0.0));
        assert_eq!(engine.pointer(), None);
    }

    #[test]
    fn test_resize_reaches_surface() {
        let mut engine = start(8);
        engine.resize(1024, 768);
        assert_eq!(engine.surface().size, (1024, 768));
    }
}
