//! Test support for the wirebound crates: an in-memory transport and a
//! minimal message protocol shared by the integration tests.

pub mod harness;
pub mod memory_transport;
pub mod test_protocol;

pub use memory_transport::{MemoryClientTransport, MemoryServerTransport};
pub use test_protocol::{
    protocol, AuthRequest, ChatMessage, PositionUpdate, StatusQuery, StatusReply,
};
