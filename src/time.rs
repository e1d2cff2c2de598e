//! The global clock.
//!
//! One clock drives the particles, the grid floor and the emblem. It starts
//! when the engine is mounted and only ever moves forward; there is no pause.
//!
//! ```ignore
//! let mut time = Time::new();
//!
//! // In the render loop:
//! let elapsed = time.update();
//! engine.frame(elapsed)?;
//! ```

use std::time::{Duration, Instant};

/// Elapsed time, frame counting and an FPS estimate.
#[derive(Debug)]
pub struct Time {
    /// When the clock was created.
    start: Instant,
    /// When the last frame occurred.
    last_frame: Instant,
    /// Total elapsed time in seconds (cached for fast access).
    elapsed_secs: f32,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
    /// Set by `update` when the FPS estimate was refreshed.
    fps_refreshed: bool,
}

impl Time {
    /// Start a clock now.
    pub fn new() -> Self {
        Self::with_fps_interval(Duration::from_secs(1))
    }

    /// Start a clock that refreshes its FPS estimate every `interval`.
    pub fn with_fps_interval(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: interval,
            fps_refreshed: false,
        }
    }

    /// Advance to the current instant. Call once per frame.
    ///
    /// Returns the elapsed time in seconds since the clock started.
    pub fn update(&mut self) -> f32 {
        self.update_at(Instant::now())
    }

    /// Advance to `now`. Instants earlier than the last frame are treated as
    /// the last frame, so the clock never runs backwards.
    pub fn update_at(&mut self, now: Instant) -> f32 {
        let now = now.max(self.last_frame);

        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.elapsed_secs = now.duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        self.fps_refreshed = fps_elapsed >= self.fps_update_interval;
        if self.fps_refreshed {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.elapsed_secs
    }

    /// Total elapsed time in seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time since last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Whether the last `update` refreshed the FPS estimate.
    #[inline]
    pub fn fps_refreshed(&self) -> bool {
        self.fps_refreshed
    }

    /// Get the raw start instant.
    #[inline]
    pub fn start_instant(&self) -> Instant {
        self.start
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
        assert_eq!(time.fps(), 0.0);
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let elapsed = time.update();

        assert!(elapsed > 0.0);
        assert!(time.delta() > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_update_at_is_exact() {
        let mut time = Time::new();
        let start = time.start_instant();

        assert!((time.update_at(start + Duration::from_millis(500)) - 0.5).abs() < 1e-6);
        assert!((time.update_at(start + Duration::from_millis(750)) - 0.75).abs() < 1e-6);
        assert!((time.delta() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_never_runs_backwards() {
        let mut time = Time::new();
        let start = time.start_instant();
        time.update_at(start + Duration::from_secs(2));
        let elapsed = time.update_at(start + Duration::from_secs(1));
        assert_eq!(elapsed, 2.0);
        assert_eq!(time.delta(), 0.0);
    }

    #[test]
    fn test_fps_estimate() {
        let mut time = Time::with_fps_interval(Duration::from_secs(1));
        let start = time.start_instant();
        for i in 1..=60u64 {
            time.update_at(start + Duration::from_micros(i * 1_000_000 / 60));
        }
        assert!(time.fps_refreshed());
        assert!((time.fps() - 60.0).abs() < 0.5);
    }
}
