use std::time::Duration;

use wirebound_shared::{ExpMovingAverage, GameInstant, Timer};

/// Measures the link to the server. Pings carry the client's clock; the
/// server echoes it back unmodified, so one subtraction on pong receipt
/// yields a round trip sample with no shared clock required.
pub struct TimeManager {
    ping_timer: Timer,
    rtt_average: ExpMovingAverage,
    jitter_average: ExpMovingAverage,
}

impl TimeManager {
    pub fn new(ping_interval: Duration, smoothing_window: u32) -> Self {
        Self {
            ping_timer: Timer::new(ping_interval),
            rtt_average: ExpMovingAverage::new(smoothing_window),
            jitter_average: ExpMovingAverage::new(smoothing_window),
        }
    }

    pub fn should_send_ping(&self) -> bool {
        self.ping_timer.ringing()
    }

    pub fn mark_ping_sent(&mut self) {
        self.ping_timer.reset();
    }

    /// Folds one pong into the averages. `echoed_millis` is the clock value
    /// this client originally put in the ping
    pub fn record_pong(&mut self, now: GameInstant, echoed_millis: u64) {
        let rtt_sample = now.as_millis().saturating_sub(echoed_millis) as f64;
        let deviation = if self.rtt_average.is_initialized() {
            (rtt_sample - self.rtt_average.value()).abs()
        } else {
            0.0
        };
        self.rtt_average.add(rtt_sample);
        self.jitter_average.add(deviation);
    }

    /// Smoothed round trip time in milliseconds
    pub fn rtt(&self) -> f32 {
        self.rtt_average.value() as f32
    }

    /// Smoothed deviation between consecutive round trip samples, in
    /// milliseconds
    pub fn jitter(&self) -> f32 {
        self.jitter_average.value() as f32
    }

    /// One-way latency estimate: half the smoothed round trip
    pub fn one_way_latency(&self) -> f32 {
        self.rtt() / 2.0
    }

    pub fn has_samples(&self) -> bool {
        self.rtt_average.is_initialized()
    }
}
