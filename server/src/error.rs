use thiserror::Error;

use wirebound_shared::{BatchError, ConnectionId, MessageError, TransportError};

/// Errors that can occur during server operations
#[derive(Debug, Error)]
pub enum ServerError {
    /// The server has not been started with a transport yet
    #[error("Server is not listening. Call listen() with a transport before using this operation")]
    NotListening,
    /// The referenced connection does not exist or has already fully
    /// disconnected
    #[error("Unknown connection: {0}")]
    UnknownConnection(ConnectionId),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error(transparent)]
    Batch(#[from] BatchError),
}
