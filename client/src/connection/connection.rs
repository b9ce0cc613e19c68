use std::time::Duration;

use wirebound_shared::{BaseConnection, ConnectionConfig, ConnectionId, ConnectionState};

use crate::connection::time_manager::TimeManager;

/// Client-side state for the single connection to the server
pub struct ServerConnection {
    id: ConnectionId,
    pub base: BaseConnection,
    pub time_manager: TimeManager,
    state: ConnectionState,
}

impl ServerConnection {
    pub fn new(
        id: ConnectionId,
        config: &ConnectionConfig,
        ping_interval: Duration,
        smoothing_window: u32,
        reliable_max: usize,
        unreliable_max: usize,
    ) -> Self {
        Self {
            id,
            base: BaseConnection::new(config, reliable_max, unreliable_max),
            time_manager: TimeManager::new(ping_interval, smoothing_window),
            state: ConnectionState::Connected,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_disconnecting(&self) -> bool {
        self.state.is_disconnecting()
    }

    pub fn authenticate(&mut self) {
        if self.state == ConnectionState::Connected {
            self.state = ConnectionState::Authenticated;
        }
    }

    pub fn begin_disconnect(&mut self) {
        if !self.state.is_disconnecting() {
            self.state = ConnectionState::Disconnecting;
        }
    }

    pub fn finalize_disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.base.release_buffers();
    }
}
