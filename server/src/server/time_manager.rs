use std::time::{Duration, Instant};

use wirebound_shared::{ExpMovingAverage, Tick, Timer};

/// Drives the server's fixed tick. Outgoing batches are flushed only when the
/// tick timer rings, so `send_all_updates()` may be called every frame without
/// flooding the wire.
pub struct TimeManager {
    tick_interval: Duration,
    tick_timer: Timer,
    current_tick: Tick,
    last_flush: Option<Instant>,
    tick_duration_average: ExpMovingAverage,
}

impl TimeManager {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            tick_timer: Timer::new(tick_interval),
            current_tick: 0,
            last_flush: None,
            tick_duration_average: ExpMovingAverage::new(8),
        }
    }

    /// Whether enough time has passed since the last flush for another tick
    pub fn should_flush(&self) -> bool {
        self.tick_timer.ringing()
    }

    /// Advances the tick and records the achieved tick duration
    pub fn record_flush(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_flush {
            let achieved = now.duration_since(last);
            self.tick_duration_average
                .add(achieved.as_secs_f64() * 1000.0);
        }
        self.last_flush = Some(now);
        self.current_tick = self.current_tick.wrapping_add(1);
        self.tick_timer.reset();
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// The achieved tick duration, smoothed. Equal to the configured
    /// interval until enough flushes have happened to measure
    pub fn average_tick_duration(&self) -> Duration {
        if self.tick_duration_average.is_initialized() {
            Duration::from_secs_f64(self.tick_duration_average.value() / 1000.0)
        } else {
            self.tick_interval
        }
    }
}
