use std::time::{Duration, Instant};

/// A simple interval timer used to gate heartbeats, pings, send flushes and
/// connection timeouts.
pub struct Timer {
    duration: Duration,
    last: Instant,
}

impl Timer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            last: Instant::now(),
        }
    }

    /// Returns whether the configured interval has elapsed since the last
    /// reset
    pub fn ringing(&self) -> bool {
        self.last.elapsed() >= self.duration
    }

    pub fn reset(&mut self) {
        self.last = Instant::now();
    }
}
