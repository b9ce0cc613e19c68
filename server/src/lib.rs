//! # Wirebound Server
//! A tick-driven server that uses a pluggable transport to send/receive
//! batched messages to/from connected clients, and scopes networked entities
//! to the clients observing them.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use wirebound_shared::{
        Channel, CodecLimits, ConnectionConfig, ConnectionId, GameInstant, ListenConfig, Message,
        MessageContainer, MessageKind, Named, NetworkId, Protocol, ResponseId, Serde, Tick,
        Transport, TransportError, TransportEvent,
    };
}

mod connection;
mod error;
mod events;
mod scope;
mod server;

pub use error::ServerError;
pub use events::{ConnectEvent, DisconnectEvent, ErrorEvent, Event, Events, TickEvent};
pub use scope::{
    entity_record::EntityRecord,
    scope_manager::{InterestDelta, ScopeManager},
};
pub use server::{server::Server, server_config::ServerConfig};
