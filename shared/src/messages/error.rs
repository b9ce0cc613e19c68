use thiserror::Error;

use crate::codec::error::CodecError;

/// Errors that can occur while packing or unpacking message envelopes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// Envelope payload failed to encode or decode
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Envelope shorter than the opcode itself. Hostile or corrupted input
    #[error("Envelope of {length} bytes is shorter than the 2-byte opcode header")]
    TruncatedHeader { length: usize },

    /// Opcode with no registration on this end. The peer is mismatched or
    /// malicious; the connection must be closed since the unread payload
    /// would desynchronize the rest of the batch
    #[error("No message registered for opcode {opcode:#06x}")]
    UnknownKind { opcode: u16 },

    /// Attempted to pack a message type never registered with the Protocol.
    /// A misconfigured build, not a network condition
    #[error("Message type '{name}' was never registered with the Protocol via add_message()")]
    KindNotRegistered { name: &'static str },

    /// The deserializer consumed fewer bytes than the envelope carried,
    /// meaning the two ends disagree about the type's wire layout
    #[error("Envelope for '{name}' left {remaining} undecoded bytes")]
    TrailingBytes {
        name: &'static str,
        remaining: usize,
    },
}

/// Errors that can occur while batching or unbatching envelopes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// Batch shorter than its own timestamp header
    #[error("Batch of {length} bytes is shorter than the {header} byte batch header")]
    TruncatedBatch { length: usize, header: usize },

    /// An envelope size prefix pointed past the end of the batch
    #[error("Envelope declares {declared} bytes but only {remaining} remain in the batch")]
    TruncatedEnvelope { declared: usize, remaining: usize },

    /// A single envelope too large for any batch on this channel
    #[error("Envelope of {length} bytes exceeds the {max} byte limit for this channel")]
    EnvelopeTooLarge { length: usize, max: usize },

    /// The receiving queue is full; the peer is sending faster than the
    /// owner thread is draining
    #[error("Unbatcher queue is full ({limit} envelopes)")]
    QueueFull { limit: usize },
}
