use std::time::Duration;

use wirebound_shared::ConnectionConfig;

/// Contains Config properties which will be used by the Client
#[derive(Clone)]
pub struct ClientConfig {
    /// Used to configure the connection to the Server
    pub connection: ConnectionConfig,
    /// The interval at which pings are sent to measure round trip time
    pub ping_interval: Duration,
    /// Sample window for the RTT/jitter exponential moving averages
    pub rtt_smoothing_window: u32,
    /// Whether the client reconnects automatically after an unexpected
    /// disconnect
    pub auto_connect: bool,
    /// Multiplier applied to jitter when computing the interpolation delay
    /// for received snapshots
    pub interpolation_buffer_multiplier: f32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            ping_interval: Duration::from_secs(2),
            rtt_smoothing_window: 6,
            auto_connect: false,
            interpolation_buffer_multiplier: 2.0,
        }
    }
}
