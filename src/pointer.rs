//! Pointer tracking.
//!
//! The host window feeds cursor events in between frames; the engine reads a
//! plain snapshot once at the start of each frame. Both happen on the event
//! loop thread, so the handoff needs no synchronisation.

use glam::Vec2;
use winit::event::WindowEvent;

/// Last known pointer position in normalized device coordinates.
///
/// Origin is at the center of the window, x increases to the right and y
/// increases upward. Both axes are clamped to `[-1, 1]`. Absence of movement
/// keeps the last value.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    ndc: Vec2,
    window_size: (u32, u32),
    attached: bool,
}

impl PointerTracker {
    /// Create an attached tracker resting at the center.
    pub fn new() -> Self {
        Self {
            ndc: Vec2::ZERO,
            window_size: (800, 600),
            attached: true,
        }
    }

    /// Pointer offset for the current frame.
    #[inline]
    pub fn snapshot(&self) -> Vec2 {
        self.ndc
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Stop accepting pointer updates.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Update window size for NDC calculations.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Set the offset directly, clamped to `[-1, 1]` per axis.
    pub fn set_ndc(&mut self, ndc: Vec2) {
        if self.attached {
            self.ndc = ndc.clamp(Vec2::NEG_ONE, Vec2::ONE);
        }
    }

    /// Set the offset from a cursor position in physical pixels.
    pub fn set_cursor(&mut self, x: f64, y: f64) {
        let (w, h) = self.window_size;
        if w > 0 && h > 0 {
            self.set_ndc(Vec2::new(
                (x as f32 / w as f32) * 2.0 - 1.0,
                1.0 - (y as f32 / h as f32) * 2.0, // Y flipped
            ));
        }
    }

    /// Process a winit window event. Returns `true` if the pointer moved.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } if self.attached => {
                let before = self.ndc;
                self.set_cursor(position.x, position.y);
                self.ndc != before
            }
            WindowEvent::Resized(size) => {
                self.set_window_size(size.width, size.height);
                false
            }
            _ => false,
        }
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}
