//! Frame rate capping.

use std::time::{Duration, Instant};

/// Caps a loop to at most one iteration per `period` by sleeping out whatever is left of the
/// period once a frame finishes.
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    period: Duration,
}

impl FramePacer {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Creates a pacer allowing at most `fps` frames per second. A rate of zero disables pacing.
    pub fn from_fps(fps: u32) -> Self {
        if fps == 0 {
            Self::new(Duration::ZERO)
        } else {
            Self::new(Duration::from_secs(1) / fps)
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// How long to sleep after a frame that took `elapsed`. Never negative.
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.period.saturating_sub(elapsed)
    }

    /// Sleeps for the rest of the frame that started at `frame_start`.
    pub fn wait(&self, frame_start: Instant) {
        let remaining = self.remaining(frame_start.elapsed());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}
