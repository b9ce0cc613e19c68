//! Minimal message set used by the integration tests.

use wirebound_shared::{
    message_impl, ByteReader, ByteWriter, CodecError, Protocol, Quat, Serde, Vec3,
};

/// Sent before authentication; carries an optional token
#[derive(Debug, Clone, PartialEq)]
pub struct AuthRequest {
    pub token: Option<String>,
}

impl Serde for AuthRequest {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_string(self.token.as_deref())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Self {
            token: reader.read_string()?,
        })
    }
}

message_impl!(AuthRequest, "wirebound_test::AuthRequest");

/// Only accepted from authenticated connections
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub text: String,
}

impl Serde for ChatMessage {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        self.text.ser(writer)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Self {
            text: String::de(reader)?,
        })
    }
}

message_impl!(ChatMessage, "wirebound_test::ChatMessage");

#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Serde for PositionUpdate {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        self.position.ser(writer)?;
        self.rotation.ser(writer)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Self {
            position: Vec3::de(reader)?,
            rotation: Quat::de(reader)?,
        })
    }
}

message_impl!(PositionUpdate, "wirebound_test::PositionUpdate");

/// Request half of a correlated exchange; the response id travels in the
/// payload and comes back in the reply
#[derive(Debug, Clone, PartialEq)]
pub struct StatusQuery {
    pub response_id: u16,
}

impl Serde for StatusQuery {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_u16(self.response_id);
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Self {
            response_id: reader.read_u16()?,
        })
    }
}

message_impl!(StatusQuery, "wirebound_test::StatusQuery");

#[derive(Debug, Clone, PartialEq)]
pub struct StatusReply {
    pub response_id: u16,
    pub status: String,
}

impl Serde for StatusReply {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_u16(self.response_id);
        self.status.ser(writer)
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Self {
            response_id: reader.read_u16()?,
            status: String::de(reader)?,
        })
    }
}

message_impl!(StatusReply, "wirebound_test::StatusReply");

pub fn protocol() -> Protocol {
    // Zero tick interval so tests flush on every pump instead of waiting
    // out a real tick.
    Protocol::builder()
        .tick_interval(std::time::Duration::ZERO)
        .add_message::<AuthRequest>()
        .add_message_with_auth::<ChatMessage>()
        .add_message_with_auth::<PositionUpdate>()
        .add_message::<StatusQuery>()
        .add_message::<StatusReply>()
        .build()
}
