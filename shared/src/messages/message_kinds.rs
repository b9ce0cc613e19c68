use std::collections::{hash_map::Entry, HashMap};

use log::warn;

use crate::{
    codec::{reader::ByteReader, writer::ByteWriter, CodecLimits, Serde},
    messages::{
        error::MessageError,
        message::{Message, MessageContainer},
        named::Named,
    },
};

/// The number of bytes an envelope spends on its opcode
pub const OPCODE_SIZE: usize = 2;

/// A 16-bit wire opcode, derived from a message type's registered name.
///
/// Pinned derivation: FNV-1a over the UTF-8 bytes of the name with the
/// standard 32-bit offset basis/prime, then xor-folded to 16 bits
/// (`h ^ (h >> 16)`). This is a pure function of the name, so two
/// independently compiled processes agree on every opcode without any
/// negotiation. A collision between two different names is a configuration
/// error caught at registration, never a runtime condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKind(u16);

impl MessageKind {
    pub fn of<M: Named>() -> Self {
        Self(fnv1a_fold_16(M::name()))
    }

    pub fn from_u16(value: u16) -> Self {
        Self(value)
    }

    pub fn to_u16(&self) -> u16 {
        self.0
    }
}

fn fnv1a_fold_16(name: &str) -> u16 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    let mut hash = OFFSET_BASIS;
    for byte in name.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    (hash ^ (hash >> 16)) as u16
}

type MessageDeserializer = fn(&mut ByteReader) -> Result<MessageContainer, MessageError>;

/// One entry of the opcode table: the pinned name, the explicit deserializer
/// function, and whether the connection must be authenticated before this
/// kind is accepted.
pub struct MessageRegistration {
    name: &'static str,
    require_auth: bool,
    deserializer: MessageDeserializer,
}

impl MessageRegistration {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn require_auth(&self) -> bool {
        self.require_auth
    }
}

/// The registry mapping compile-time message types to wire opcodes and back.
pub struct MessageKinds {
    kinds: HashMap<MessageKind, MessageRegistration>,
}

impl MessageKinds {
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Registers a message type that may be received before authentication
    pub fn add_message<M: Message + Named + Serde>(&mut self) {
        self.add_message_with_auth::<M>(false);
    }

    /// Registers a message type, optionally gating it behind authentication.
    ///
    /// Re-registering the same name overwrites the previous entry with a
    /// diagnostic. Two *different* names hashing to the same opcode panic
    /// immediately: that is a misconfigured build, not a live network
    /// condition, and both processes must agree before any traffic flows.
    pub fn add_message_with_auth<M: Message + Named + Serde>(&mut self, require_auth: bool) {
        let kind = MessageKind::of::<M>();
        let registration = MessageRegistration {
            name: <M as Named>::name(),
            require_auth,
            deserializer: deserialize_boxed::<M>,
        };
        match self.kinds.entry(kind) {
            Entry::Occupied(mut occupied) => {
                let existing = occupied.get().name;
                if existing != <M as Named>::name() {
                    panic!(
                        "Message kind collision: '{}' and '{}' both hash to {:#06x}. Rename one of them",
                        existing,
                        <M as Named>::name(),
                        kind.to_u16()
                    );
                }
                warn!(
                    "Message '{}' registered twice, overwriting previous registration",
                    <M as Named>::name()
                );
                occupied.insert(registration);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(registration);
            }
        }
    }

    pub fn registration(&self, kind: &MessageKind) -> Option<&MessageRegistration> {
        self.kinds.get(kind)
    }

    pub fn is_registered(&self, kind: &MessageKind) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Writes an envelope: opcode, then the message's own serialization
    pub fn pack(
        &self,
        message: &dyn Message,
        limits: &CodecLimits,
    ) -> Result<Vec<u8>, MessageError> {
        let kind = message.kind();
        if !self.kinds.contains_key(&kind) {
            return Err(MessageError::KindNotRegistered {
                name: message.name(),
            });
        }
        let mut writer = ByteWriter::with_limits(*limits);
        writer.write_u16(kind.to_u16());
        message.ser(&mut writer)?;
        Ok(writer.to_bytes())
    }

    /// Reads an envelope back into a message container. Every byte of the
    /// envelope must be consumed: leftover bytes mean the sender and
    /// receiver disagree about the type's layout, which is treated the same
    /// as any other malformed input
    pub fn unpack(
        &self,
        envelope: &[u8],
        limits: &CodecLimits,
    ) -> Result<MessageContainer, MessageError> {
        if envelope.len() < OPCODE_SIZE {
            return Err(MessageError::TruncatedHeader {
                length: envelope.len(),
            });
        }
        let mut reader = ByteReader::with_limits(envelope, *limits);
        let opcode = reader.read_u16()?;
        let kind = MessageKind::from_u16(opcode);
        let registration = self
            .kinds
            .get(&kind)
            .ok_or(MessageError::UnknownKind { opcode })?;
        let container = (registration.deserializer)(&mut reader)?;
        if !reader.is_empty() {
            return Err(MessageError::TrailingBytes {
                name: registration.name,
                remaining: reader.remaining(),
            });
        }
        Ok(container)
    }
}

impl Default for MessageKinds {
    fn default() -> Self {
        Self::new()
    }
}

fn deserialize_boxed<M: Message + Serde>(
    reader: &mut ByteReader,
) -> Result<MessageContainer, MessageError> {
    let message = M::de(reader)?;
    Ok(MessageContainer::from_message(message))
}
