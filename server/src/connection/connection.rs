use wirebound_shared::{
    BaseConnection, ConnectionConfig, ConnectionId, ConnectionState,
};

/// Server-side state for one connected client
pub struct Connection {
    id: ConnectionId,
    pub base: BaseConnection,
    state: ConnectionState,
}

impl Connection {
    pub fn new(
        id: ConnectionId,
        config: &ConnectionConfig,
        reliable_max: usize,
        unreliable_max: usize,
    ) -> Self {
        Self {
            id,
            base: BaseConnection::new(config, reliable_max, unreliable_max),
            state: ConnectionState::Connected,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn is_disconnecting(&self) -> bool {
        self.state.is_disconnecting()
    }

    pub fn authenticate(&mut self) {
        if self.state == ConnectionState::Connected {
            self.state = ConnectionState::Authenticated;
        }
    }

    /// Moves into Disconnecting. Idempotent; further inbound data from this
    /// connection is dropped until the transport confirms teardown
    pub fn begin_disconnect(&mut self) {
        if !self.state.is_disconnecting() {
            self.state = ConnectionState::Disconnecting;
        }
    }

    /// Final transition, releases the connection's buffers
    pub fn finalize_disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.base.release_buffers();
    }
}
