//! # Wirebound Shared
//! Common functionality shared between wirebound-server & wirebound-client crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod backends;
mod codec;
mod connection;
mod game_time;
mod key_generator;
mod messages;
mod protocol;
mod transport;
mod types;

pub use backends::Timer;
pub use codec::{
    error::CodecError,
    reader::ByteReader,
    vector::{Quat, Vec2, Vec3},
    writer::ByteWriter,
    CodecLimits, Serde,
};
pub use connection::{
    bandwidth_monitor::BandwidthMonitor,
    base_connection::BaseConnection,
    connection_config::ConnectionConfig,
    connection_state::ConnectionState,
    moving_average::ExpMovingAverage,
};
pub use game_time::GameInstant;
pub use key_generator::KeyGenerator;
pub use messages::{
    batch::{Batcher, BATCH_HEADER_SIZE, ENVELOPE_SIZE_PREFIX},
    error::{BatchError, MessageError},
    message::{Message, MessageContainer},
    message_kinds::{MessageKind, MessageKinds, MessageRegistration},
    named::Named,
    request::{ResponseId, ResponseTracker},
    system_messages::{InterestMessage, LostInterestMessage, Ping, Pong},
    unbatcher::Unbatcher,
};
pub use protocol::{Protocol, ProtocolError};
pub use transport::{
    error::TransportError, Channel, ListenConfig, Transport, TransportEvent,
};
pub use types::{ConnectionId, NetworkId, Tick};
