//! The seam between the engine and a rendering backend.
//!
//! The engine writes the instance buffer and evaluates the scene; a
//! [`RenderSurface`] consumes both. [`GpuState`](crate::gpu::GpuState) is the
//! wgpu implementation, [`HeadlessSurface`] records what it is given.

use crate::error::EngineError;
use crate::instance::InstanceBuffer;
use crate::scene::SceneFrame;

/// A rendering backend driven once per frame.
pub trait RenderSurface {
    /// Prepare per-particle storage for `capacity` instances, `ai_count` of
    /// which (the leading slots) are AI.
    fn allocate(&mut self, capacity: usize, ai_count: usize);

    /// Copy the dirty channels of `instances` to the backend.
    fn upload(&mut self, instances: &InstanceBuffer);

    /// Draw one frame.
    fn present(&mut self, scene: &SceneFrame) -> Result<(), EngineError>;

    /// The drawable area changed size.
    fn resize(&mut self, width: u32, height: u32);

    /// Drop per-particle storage. Further uploads must be ignored.
    fn release(&mut self);
}

/// Surface that draws nothing and records every call.
#[derive(Debug, Default, Clone)]
pub struct HeadlessSurface {
    pub capacity: Option<usize>,
    pub ai_count: usize,
    /// Matrix uploads performed (only counted when the channel was dirty).
    pub matrix_uploads: u64,
    /// Color uploads performed (only counted when the channel was dirty).
    pub color_uploads: u64,
    /// Uploads that arrived while nothing was allocated.
    pub ignored_uploads: u64,
    pub presents: u64,
    pub last_scene_time: Option<f32>,
    pub size: (u32, u32),
    pub released: bool,
    /// Copy of the most recently uploaded matrices channel.
    pub last_matrices: Vec<u8>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for HeadlessSurface {
    fn allocate(&mut self, capacity: usize, ai_count: usize) {
        self.capacity = Some(capacity);
        self.ai_count = ai_count;
        self.released = false;
    }

    fn upload(&mut self, instances: &InstanceBuffer) {
        if self.capacity.is_none() {
            self.ignored_uploads += 1;
            return;
        }
        if instances.is_matrix_dirty() {
            self.matrix_uploads += 1;
            self.last_matrices.clear();
            self.last_matrices.extend_from_slice(instances.matrix_bytes());
        }
        if instances.is_color_dirty() {
            self.color_uploads += 1;
        }
    }

    fn present(&mut self, scene: &SceneFrame) -> Result<(), EngineError> {
        self.presents += 1;
        self.last_scene_time = Some(scene.time);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn release(&mut self) {
        self.capacity = None;
        self.released = true;
    }
}
