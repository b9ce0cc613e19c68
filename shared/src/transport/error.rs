use thiserror::Error;

/// Faults a transport backend can report. These are events, not exceptions:
/// the core answers them by disconnecting the affected connection and keeps
/// every other connection running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Hostname could not be resolved
    #[error("DNS resolution failed for '{address}'")]
    DnsResolve { address: String },

    /// The remote host actively refused the connection
    #[error("Connection refused by '{address}'")]
    Refused { address: String },

    /// No answer within the backend's handshake or keep-alive window
    #[error("Connection timed out")]
    Timeout,

    /// The backend's send window is exhausted
    #[error("Congestion: the send window for connection {connection_id} is exhausted")]
    Congestion { connection_id: u64 },

    /// Received data that violates the backend's own framing
    #[error("Invalid receive: {reason}")]
    InvalidReceive { reason: &'static str },

    /// A send call that the backend cannot honor (disconnected peer,
    /// oversized payload, not yet connected)
    #[error("Invalid send: {reason}")]
    InvalidSend { reason: &'static str },

    /// The remote end closed the connection
    #[error("Connection {connection_id} closed by the remote host")]
    ConnectionClosed { connection_id: u64 },

    /// Anything the backend cannot classify
    #[error("Unexpected transport error: {reason}")]
    Unexpected { reason: String },
}
