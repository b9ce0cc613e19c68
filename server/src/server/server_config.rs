use wirebound_shared::ConnectionConfig;

/// Contains Config properties which will be used by the Server
#[derive(Clone)]
pub struct ServerConfig {
    /// Used to configure every connection to the Server
    pub connection: ConnectionConfig,
    /// Connections beyond this count are refused at the transport level; the
    /// newcomer is rejected, established connections are unaffected
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            max_connections: 64,
        }
    }
}
