use std::collections::VecDeque;
use std::time::Duration;

use crate::game_time::GameInstant;

/// Per-connection byte accounting over a rolling window. Constructed only
/// when diagnostics are enabled, so the disabled path costs nothing.
pub struct BandwidthMonitor {
    window: Duration,
    incoming: VecDeque<(GameInstant, usize)>,
    outgoing: VecDeque<(GameInstant, usize)>,
    total_incoming: u64,
    total_outgoing: u64,
}

impl BandwidthMonitor {
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs(10))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            incoming: VecDeque::new(),
            outgoing: VecDeque::new(),
            total_incoming: 0,
            total_outgoing: 0,
        }
    }

    pub fn record_incoming(&mut self, now: GameInstant, bytes: usize) {
        self.total_incoming += bytes as u64;
        self.incoming.push_back((now, bytes));
        prune(&mut self.incoming, now, self.window);
    }

    pub fn record_outgoing(&mut self, now: GameInstant, bytes: usize) {
        self.total_outgoing += bytes as u64;
        self.outgoing.push_back((now, bytes));
        prune(&mut self.outgoing, now, self.window);
    }

    pub fn total_incoming(&self) -> u64 {
        self.total_incoming
    }

    pub fn total_outgoing(&self) -> u64 {
        self.total_outgoing
    }

    /// Average inbound bytes per second over the window
    pub fn incoming_bandwidth(&mut self, now: GameInstant) -> f32 {
        prune(&mut self.incoming, now, self.window);
        per_second(&self.incoming, self.window)
    }

    /// Average outbound bytes per second over the window
    pub fn outgoing_bandwidth(&mut self, now: GameInstant) -> f32 {
        prune(&mut self.outgoing, now, self.window);
        per_second(&self.outgoing, self.window)
    }
}

impl Default for BandwidthMonitor {
    fn default() -> Self {
        Self::new()
    }
}

fn prune(samples: &mut VecDeque<(GameInstant, usize)>, now: GameInstant, window: Duration) {
    let cutoff = now.as_millis().saturating_sub(window.as_millis() as u64);
    while let Some((instant, _)) = samples.front() {
        if instant.as_millis() < cutoff {
            samples.pop_front();
        } else {
            break;
        }
    }
}

fn per_second(samples: &VecDeque<(GameInstant, usize)>, window: Duration) -> f32 {
    let total: usize = samples.iter().map(|(_, bytes)| bytes).sum();
    total as f32 / window.as_secs_f32()
}
