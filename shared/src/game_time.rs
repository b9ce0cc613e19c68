use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A millisecond-resolution wall-clock instant, comparable and cheap to copy.
/// Batch timestamps and ping payloads carry this value on the wire, so it is
/// defined as milliseconds since the Unix epoch rather than a process-local
/// monotonic reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GameInstant(u64);

impl GameInstant {
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64;
        Self(millis)
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Saturating difference, zero if `earlier` is actually later
    pub fn duration_since(&self, earlier: &GameInstant) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    pub fn add_duration(&self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration.as_millis() as u64))
    }

    pub fn is_at_or_after(&self, other: &GameInstant) -> bool {
        self.0 >= other.0
    }
}
