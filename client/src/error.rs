use thiserror::Error;

use wirebound_shared::{BatchError, MessageError, TransportError};

/// Errors that can occur during client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// The client has no live connection to a server
    #[error("Client is not connected. Call connect() with a transport before using this operation")]
    NotConnected,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error(transparent)]
    Batch(#[from] BatchError),
}
