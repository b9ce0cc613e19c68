pub mod error;

use std::collections::VecDeque;

use error::TransportError;

use crate::types::ConnectionId;

/// The two delivery paths every backend must expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Ordered and retransmitted; head-of-line blocking tolerated
    Reliable,
    /// Best-effort, no retransmission
    Unreliable,
}

/// Listen-side configuration handed to a backend.
#[derive(Clone, Debug)]
pub struct ListenConfig {
    pub address: String,
}

/// One completed event from the backend, drained by the owner thread at the
/// start of each tick.
#[derive(Debug)]
pub enum TransportEvent {
    Connected(ConnectionId),
    Data(ConnectionId, Channel, Vec<u8>),
    Error(ConnectionId, TransportError),
    Disconnected(ConnectionId),
}

/// The sole wire-level extension point. A reliable congestion-controlled UDP
/// backend, a relay/NAT-traversal backend, or an in-memory test backend all
/// plug in by implementing this contract.
///
/// Contract requirements beyond the signatures:
/// - Connection ids are unique, non-zero, and scoped to one instance; id 0
///   is reserved for the local host.
/// - `Connected` for a connection is delivered before any of its `Data`
///   events, and is never silently dropped while buffered `Data` exists.
/// - Faults surface as `TransportEvent::Error`, never as panics, so the
///   caller can disconnect the affected connection without crashing.
/// - A backend may run internal I/O threads, but completed events must be
///   handed to the owner thread through a thread-safe queue; callbacks are
///   never invoked concurrently with tick processing.
pub trait Transport {
    /// Client side: begin connecting to a remote address
    fn connect(&mut self, address: &str) -> Result<(), TransportError>;

    /// Server side: begin accepting connections
    fn listen(&mut self, config: &ListenConfig) -> Result<(), TransportError>;

    fn send(
        &mut self,
        connection_id: ConnectionId,
        payload: &[u8],
        channel: Channel,
    ) -> Result<(), TransportError>;

    /// Drain all completed events into `events`. Non-blocking
    fn poll_events(&mut self, events: &mut VecDeque<TransportEvent>);

    fn disconnect(&mut self, connection_id: ConnectionId);

    fn shutdown(&mut self);

    /// The batching threshold for the given channel. On the unreliable
    /// channel this is a hard limit and `send` refuses larger payloads; on
    /// the reliable channel the backend must accept larger payloads and
    /// fragment internally, so a single envelope past the threshold still
    /// goes out in its own batch
    fn max_packet_size(&self, channel: Channel) -> usize;
}
