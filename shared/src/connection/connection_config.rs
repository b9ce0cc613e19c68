use std::default::Default;
use std::time::Duration;

/// Contains Config properties which will be used by a connection on either
/// side of the wire
#[derive(Clone)]
pub struct ConnectionConfig {
    /// The duration to wait before dropping a connection that has gone
    /// silent
    pub disconnection_timeout_duration: Duration,
    /// The duration after which an empty keep-alive batch is sent if
    /// nothing else went out
    pub heartbeat_interval: Duration,
    /// Flagged violations tolerated before the connection is dropped; the
    /// violation that exceeds this count disconnects
    pub spam_violation_threshold: u16,
    /// Upper bound on envelopes buffered in the unbatcher before the peer
    /// is considered to be flooding
    pub max_queued_envelopes: usize,
    /// Whether per-connection byte accounting is collected. Off by default;
    /// when off the monitor is not even constructed
    pub bandwidth_monitor: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            disconnection_timeout_duration: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(3),
            spam_violation_threshold: 10,
            max_queued_envelopes: 1024,
            bandwidth_monitor: false,
        }
    }
}
