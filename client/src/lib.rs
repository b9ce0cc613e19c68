//! # Wirebound Client
//! A client that connects to a wirebound server over a pluggable transport,
//! exchanges batched messages over reliable/unreliable channels, and keeps a
//! synchronized estimate of the link's round trip time.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use wirebound_shared::{
        Channel, CodecLimits, ConnectionConfig, ConnectionId, ConnectionState, GameInstant,
        Message, MessageContainer, MessageKind, Named, Protocol, ResponseId, Serde, Transport,
        TransportError, TransportEvent,
    };
}

mod client;
mod client_config;
mod connection;
mod error;
mod events;

pub use client::Client;
pub use client_config::ClientConfig;
pub use connection::time_manager::TimeManager;
pub use error::ClientError;
pub use events::{ConnectEvent, DisconnectEvent, ErrorEvent, Event, Events};
