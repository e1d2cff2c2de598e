//! The renderer-facing instance buffer and the scratch transform that feeds it.
//!
//! The buffer holds two flat channels, one 4x4 model matrix and one RGBA color
//! per particle, laid out exactly as the GPU vertex buffers expect them. It is
//! sized once at mount and never resized.

use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};

use crate::motion::FrameTransform;

/// Column-major 4x4 matrix row as uploaded to the GPU.
pub type MatrixRow = [[f32; 4]; 4];
/// RGBA color row as uploaded to the GPU.
pub type ColorRow = [f32; 4];

/// Staging area for one particle's transform.
///
/// A single scratch value is reused for every particle in a frame. [`stage`]
/// overwrites every field, and the composed matrix is copied out by
/// [`InstanceBuffer::write_slot`].
///
/// [`stage`]: ScratchTransform::stage
#[derive(Debug, Clone, Copy)]
pub struct ScratchTransform {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    matrix: Mat4,
    color: Vec4,
}

impl ScratchTransform {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            matrix: Mat4::IDENTITY,
            color: Vec4::ONE,
        }
    }

    /// Overwrite the scratch with `transform` and compose its matrix.
    pub fn stage(&mut self, transform: &FrameTransform, shade: Vec3) {
        let r = transform.rotation;
        self.position = transform.position;
        self.rotation = Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z);
        self.scale = Vec3::splat(transform.scale);
        self.color = shade.extend(1.0);
        self.matrix = Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position);
    }

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    #[inline]
    pub fn color(&self) -> Vec4 {
        self.color
    }
}

impl Default for ScratchTransform {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-particle matrices and colors, one slot per particle index.
#[derive(Debug, Clone)]
pub struct InstanceBuffer {
    matrices: Vec<MatrixRow>,
    colors: Vec<ColorRow>,
    matrices_dirty: bool,
    colors_dirty: bool,
    matrix_version: u64,
    color_version: u64,
}

impl InstanceBuffer {
    /// Allocate `capacity` slots, initialised to identity matrices and white.
    pub fn new(capacity: usize) -> Self {
        Self {
            matrices: vec![Mat4::IDENTITY.to_cols_array_2d(); capacity],
            colors: vec![[1.0; 4]; capacity],
            matrices_dirty: false,
            colors_dirty: false,
            matrix_version: 0,
            color_version: 0,
        }
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// Copy the scratch's matrix and color into slot `index`.
    ///
    /// Panics if `index` is out of range; slots are a bijection with the
    /// particle store, so that indicates a broken store.
    #[inline]
    pub fn write_slot(&mut self, index: usize, scratch: &ScratchTransform) {
        self.matrices[index] = scratch.matrix().to_cols_array_2d();
        self.colors[index] = scratch.color().to_array();
    }

    /// Flag both channels for upload. Called once per frame, after the pass.
    pub fn mark_dirty(&mut self) {
        self.matrices_dirty = true;
        self.colors_dirty = true;
        self.matrix_version += 1;
        self.color_version += 1;
    }

    /// Acknowledge an upload of both channels.
    pub fn clear_dirty(&mut self) {
        self.matrices_dirty = false;
        self.colors_dirty = false;
    }

    #[inline]
    pub fn is_matrix_dirty(&self) -> bool {
        self.matrices_dirty
    }

    #[inline]
    pub fn is_color_dirty(&self) -> bool {
        self.colors_dirty
    }

    /// Number of times the matrix channel has been marked dirty.
    #[inline]
    pub fn matrix_version(&self) -> u64 {
        self.matrix_version
    }

    /// Number of times the color channel has been marked dirty.
    #[inline]
    pub fn color_version(&self) -> u64 {
        self.color_version
    }

    #[inline]
    pub fn matrices(&self) -> &[MatrixRow] {
        &self.matrices
    }

    #[inline]
    pub fn colors(&self) -> &[ColorRow] {
        &self.colors
    }

    /// Matrix channel as raw bytes for upload.
    pub fn matrix_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.matrices)
    }

    /// Color channel as raw bytes for upload.
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Model matrix stored in slot `index`.
    pub fn matrix(&self, index: usize) -> Option<Mat4> {
        self.matrices.get(index).map(Mat4::from_cols_array_2d)
    }
}
