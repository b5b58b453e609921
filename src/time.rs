//! Frame timing for the animation loop.
//!
//! The network animates per frame, not per second: ticks drive rotation and
//! particle motion, so there is no delta time here. The clock only counts
//! frames and measures the frame rate for reporting.
//!
//! # Example
//!
//! ```ignore
//! use nodeweave::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//!
//! // Once per rendered frame:
//! if let Some(fps) = clock.tick() {
//!     println!("{:.1} fps", fps);
//! }
//! ```

use std::time::{Duration, Instant};

/// Frame counter with a periodically refreshed FPS figure.
#[derive(Debug)]
pub struct FrameClock {
    /// Total frames counted.
    frame_count: u64,
    /// Last computed FPS.
    fps: f32,
    /// Frame count at the last FPS update.
    fps_frame_count: u64,
    /// Time of the last FPS update.
    fps_update_time: Instant,
    /// How often FPS is recomputed.
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Create a clock starting now, refreshing FPS every 500ms.
    pub fn new() -> Self {
        Self::with_interval(Duration::from_millis(500))
    }

    /// Create a clock that refreshes FPS every `interval`.
    pub fn with_interval(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: interval,
        }
    }

    /// Count one frame. Returns the new FPS when it was recomputed.
    pub fn tick(&mut self) -> Option<f32> {
        self.tick_at(Instant::now())
    }

    /// Count one frame observed at `now`.
    pub fn tick_at(&mut self, now: Instant) -> Option<f32> {
        self.frame_count += 1;

        let since = now.saturating_duration_since(self.fps_update_time);
        if since < self.fps_update_interval || since.is_zero() {
            return None;
        }

        let frames = self.frame_count - self.fps_frame_count;
        self.fps = frames as f32 / since.as_secs_f32();
        self.fps_frame_count = self.frame_count;
        self.fps_update_time = now;
        Some(self.fps)
    }

    /// Total frames counted.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Last computed frames per second, 0 until the first update.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
