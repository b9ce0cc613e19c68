//! Messages the core itself exchanges: clock synchronization and interest
//! (visibility) notifications. Registered by `Protocol::default`, so every
//! server and client agrees on their opcodes.

use crate::{
    codec::{error::CodecError, reader::ByteReader, writer::ByteWriter, Serde},
    message_impl,
    types::NetworkId,
};

/// Sent by the client on a fixed interval over the Unreliable channel,
/// carrying the client's local clock in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ping {
    pub client_time: u64,
}

impl Serde for Ping {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_u64(self.client_time);
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Self {
            client_time: reader.read_u64()?,
        })
    }
}

message_impl!(Ping, "wirebound_shared::Ping");

/// The server's answer to a `Ping`: the received client time, echoed
/// unmodified. The client derives its round-trip sample from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pong {
    pub client_time: u64,
}

impl Serde for Pong {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_u64(self.client_time);
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Self {
            client_time: reader.read_u64()?,
        })
    }
}

message_impl!(Pong, "wirebound_shared::Pong");

/// Tells one client that an entity has entered its interest set. Carries the
/// entity's spawn payload; routed only to the affected connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterestMessage {
    pub interest_type: u8,
    pub network_id: NetworkId,
    pub payload: Vec<u8>,
}

impl Serde for InterestMessage {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_u8(self.interest_type);
        writer.write_u32(self.network_id);
        writer.write_blob(Some(&self.payload))
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Self {
            interest_type: reader.read_u8()?,
            network_id: reader.read_u32()?,
            payload: reader
                .read_blob()?
                .ok_or(CodecError::InvalidValue("null interest payload"))?,
        })
    }
}

message_impl!(InterestMessage, "wirebound_shared::InterestMessage");

/// Tells one client that an entity has left its interest set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LostInterestMessage {
    pub interest_type: u8,
    pub network_id: NetworkId,
}

impl Serde for LostInterestMessage {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_u8(self.interest_type);
        writer.write_u32(self.network_id);
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Self {
            interest_type: reader.read_u8()?,
            network_id: reader.read_u32()?,
        })
    }
}

message_impl!(LostInterestMessage, "wirebound_shared::LostInterestMessage");
