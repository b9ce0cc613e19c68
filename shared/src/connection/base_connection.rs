use crate::{
    backends::Timer,
    connection::{bandwidth_monitor::BandwidthMonitor, connection_config::ConnectionConfig},
    game_time::GameInstant,
    messages::{batch::Batcher, error::BatchError, unbatcher::Unbatcher},
    transport::Channel,
};

/// Represents a connection to a remote host, and provides the batching,
/// keep-alive and accounting machinery common to both sides of the wire.
/// The server wraps one of these per client; the client owns exactly one.
pub struct BaseConnection {
    reliable_batcher: Batcher,
    unreliable_batcher: Batcher,
    unbatcher: Unbatcher,
    heartbeat_timer: Timer,
    timeout_timer: Timer,
    spam_violations: u16,
    spam_threshold: u16,
    remote_timestamp: GameInstant,
    bandwidth_monitor: Option<BandwidthMonitor>,
}

impl BaseConnection {
    /// `reliable_max` / `unreliable_max` are the transport-reported maximum
    /// packet sizes; they become the batching thresholds per channel
    pub fn new(config: &ConnectionConfig, reliable_max: usize, unreliable_max: usize) -> Self {
        Self {
            reliable_batcher: Batcher::new(reliable_max),
            unreliable_batcher: Batcher::new(unreliable_max),
            unbatcher: Unbatcher::new(config.max_queued_envelopes),
            heartbeat_timer: Timer::new(config.heartbeat_interval),
            timeout_timer: Timer::new(config.disconnection_timeout_duration),
            spam_violations: 0,
            spam_threshold: config.spam_violation_threshold,
            remote_timestamp: GameInstant::from_millis(0),
            bandwidth_monitor: config.bandwidth_monitor.then(BandwidthMonitor::new),
        }
    }

    // Heartbeats & timeouts

    /// Record that data has been sent, deferring the next heartbeat
    pub fn mark_sent(&mut self) {
        self.heartbeat_timer.reset();
    }

    pub fn should_send_heartbeat(&self) -> bool {
        self.heartbeat_timer.ringing()
    }

    /// Record that data has been heard from the remote host
    pub fn mark_heard(&mut self) {
        self.timeout_timer.reset();
    }

    pub fn should_timeout(&self) -> bool {
        self.timeout_timer.ringing()
    }

    // Spam policy

    /// Counts one flagged violation. Returns true when this violation
    /// exceeded the threshold and the connection should be dropped
    pub fn flag_violation(&mut self) -> bool {
        self.spam_violations = self.spam_violations.saturating_add(1);
        self.spam_violations > self.spam_threshold
    }

    pub fn violations(&self) -> u16 {
        self.spam_violations
    }

    // Outgoing

    /// Largest envelope the given channel can carry
    pub fn max_envelope_size(&self, channel: Channel) -> usize {
        match channel {
            Channel::Reliable => self.reliable_batcher.max_envelope_size(),
            Channel::Unreliable => self.unreliable_batcher.max_envelope_size(),
        }
    }

    pub fn queue_envelope(
        &mut self,
        channel: Channel,
        envelope: &[u8],
        now: GameInstant,
    ) -> Result<(), BatchError> {
        match channel {
            Channel::Reliable => self.reliable_batcher.add_envelope(envelope, now),
            Channel::Unreliable => {
                // Unreliable datagrams cannot be fragmented; an envelope
                // that would not fit must be refused, not sent oversized.
                if envelope.len() > self.unreliable_batcher.max_envelope_size() {
                    return Err(BatchError::EnvelopeTooLarge {
                        length: envelope.len(),
                        max: self.unreliable_batcher.max_envelope_size(),
                    });
                }
                self.unreliable_batcher.add_envelope(envelope, now)
            }
        }
    }

    pub fn queue_heartbeat(&mut self, now: GameInstant) {
        self.reliable_batcher.add_heartbeat(now);
    }

    pub fn has_outgoing(&self, channel: Channel) -> bool {
        match channel {
            Channel::Reliable => self.reliable_batcher.has_batches(),
            Channel::Unreliable => self.unreliable_batcher.has_batches(),
        }
    }

    pub fn pop_batch(&mut self, channel: Channel) -> Option<Vec<u8>> {
        match channel {
            Channel::Reliable => self.reliable_batcher.pop_batch(),
            Channel::Unreliable => self.unreliable_batcher.pop_batch(),
        }
    }

    pub fn queued_bytes(&self) -> usize {
        self.reliable_batcher.queued_bytes() + self.unreliable_batcher.queued_bytes()
    }

    // Incoming

    pub fn receive_batch(&mut self, payload: &[u8], now: GameInstant) -> Result<(), BatchError> {
        self.mark_heard();
        if let Some(monitor) = &mut self.bandwidth_monitor {
            monitor.record_incoming(now, payload.len());
        }
        self.unbatcher.add_batch(payload)
    }

    pub fn pop_envelope(&mut self) -> Option<(GameInstant, Vec<u8>)> {
        let (timestamp, envelope) = self.unbatcher.pop_envelope()?;
        self.remote_timestamp = timestamp;
        Some((timestamp, envelope))
    }

    /// The timestamp of the most recently unbatched envelope: the remote
    /// host's clock as of that batch
    pub fn remote_timestamp(&self) -> GameInstant {
        self.remote_timestamp
    }

    // Diagnostics

    pub fn record_sent_bytes(&mut self, now: GameInstant, bytes: usize) {
        if let Some(monitor) = &mut self.bandwidth_monitor {
            monitor.record_outgoing(now, bytes);
        }
    }

    pub fn bandwidth_monitor(&mut self) -> Option<&mut BandwidthMonitor> {
        self.bandwidth_monitor.as_mut()
    }

    /// Releases all per-connection buffers
    pub fn release_buffers(&mut self) {
        self.reliable_batcher.clear();
        self.unreliable_batcher.clear();
        self.unbatcher.clear();
    }
}
