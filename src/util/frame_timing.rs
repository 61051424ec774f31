//! Frame-rate measurement for the frame driver.

use web_time::{Duration, Instant};

/// Smoothed frame-rate tracking for the frame driver.
///
/// Every tick is recorded; nothing is skipped or throttled here.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    /// Timestamp of the previous recorded frame.
    last_frame: Option<Instant>,
    /// Duration of the most recent frame interval.
    last_interval: Duration,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTiming {
    /// Create a timer that has not seen a frame yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_frame: None,
            last_interval: Duration::ZERO,
            smoothed_fps: 60.0, // Start with reasonable default
            smoothing: 0.05,
        }
    }

    /// Record a frame rendered now.
    pub fn end_frame(&mut self) {
        self.record(Instant::now());
    }

    fn record(&mut self, now: Instant) {
        let Some(last) = self.last_frame.replace(now) else {
            return;
        };
        self.last_interval = now.duration_since(last);
        let frame_time = self.last_interval.as_secs_f32();
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
    }

    /// The current FPS (smoothed).
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }

    /// Interval between the last two recorded frames.
    #[must_use]
    pub fn last_interval(&self) -> Duration {
        self.last_interval
    }
}
