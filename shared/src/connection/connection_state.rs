/// The lifecycle of a connection to a remote host.
///
/// Transitions: `Connecting` → `Connected` when the transport's connect
/// event fires and an id is assigned; `Connected` → `Authenticated` by an
/// explicit application call; any state → `Disconnecting` on an explicit
/// disconnect, a spam threshold breach, malformed data, or an unhandled
/// opcode; `Disconnecting` → `Disconnected` when the transport confirms
/// teardown and the per-connection buffers are released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Authenticated,
    Disconnecting,
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected | Self::Authenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    pub fn is_disconnecting(&self) -> bool {
        matches!(self, Self::Disconnecting | Self::Disconnected)
    }
}
