use std::any::Any;

use crate::{
    codec::{error::CodecError, writer::ByteWriter},
    messages::message_kinds::MessageKind,
};

/// An object-safe message that can be packed into an envelope. Concrete types
/// implement this through the `message_impl!` macro, which wires the type's
/// `Serde` implementation and registered name together. There is no runtime
/// reflection; the deserializer for each kind is an explicit function
/// registered at startup.
pub trait Message: Any {
    fn kind(&self) -> MessageKind;
    fn name(&self) -> &'static str;
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError>;
    fn to_boxed_any(self: Box<Self>) -> Box<dyn Any>;
}

/// A boxed message paired with its kind, as produced by unpacking an inbound
/// envelope or queued for an outbound one.
pub struct MessageContainer {
    kind: MessageKind,
    name: &'static str,
    message: Box<dyn Message>,
}

impl MessageContainer {
    pub fn from_message<M: Message>(message: M) -> Self {
        let kind = message.kind();
        let name = message.name();
        Self {
            kind,
            name,
            message: Box::new(message),
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Recover the concrete message type. Returns None if the container
    /// holds a different type
    pub fn downcast<M: Message>(self) -> Option<M> {
        self.message
            .to_boxed_any()
            .downcast::<M>()
            .ok()
            .map(|boxed| *boxed)
    }
}

/// Implements `Named` and `Message` for a type that already implements
/// `Serde`, pinning its wire name (and therefore its opcode).
#[macro_export]
macro_rules! message_impl {
    ($t:ty, $name:expr) => {
        impl $crate::Named for $t {
            fn name() -> &'static str {
                $name
            }
        }

        impl $crate::Message for $t {
            fn kind(&self) -> $crate::MessageKind {
                $crate::MessageKind::of::<$t>()
            }

            fn name(&self) -> &'static str {
                <$t as $crate::Named>::name()
            }

            fn ser(
                &self,
                writer: &mut $crate::ByteWriter,
            ) -> Result<(), $crate::CodecError> {
                $crate::Serde::ser(self, writer)
            }

            fn to_boxed_any(self: Box<Self>) -> Box<dyn std::any::Any> {
                self
            }
        }
    };
}
