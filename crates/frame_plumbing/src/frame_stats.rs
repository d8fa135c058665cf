use std::time::Duration;
use std::time::Instant;

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Counts presented frames and reports a frame rate roughly once per second.
#[derive(Debug, Clone)]
pub struct FrameStats {
    window_start: Instant,
    frames_in_window: u32,
    total_frames: u64,
}

impl FrameStats {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames_in_window: 0,
            total_frames: 0,
        }
    }

    /// Returns frames per second when a reporting interval has elapsed.
    pub fn record_frame(&mut self, now: Instant) -> Option<f32> {
        self.total_frames += 1;
        self.frames_in_window += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < REPORT_INTERVAL {
            return None;
        }
        let fps = self.frames_in_window as f32 / elapsed.as_secs_f32();
        self.window_start = now;
        self.frames_in_window = 0;
        Some(fps)
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}
