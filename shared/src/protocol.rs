use std::time::Duration;

use crate::{
    codec::{CodecLimits, Serde},
    messages::{
        message::Message,
        message_kinds::MessageKinds,
        named::Named,
        system_messages::{InterestMessage, LostInterestMessage, Ping, Pong},
    },
};

pub mod error;
pub use error::ProtocolError;

// Protocol
pub struct Protocol {
    pub message_kinds: MessageKinds,
    /// The duration between each tick
    pub tick_interval: Duration,
    /// Size bounds enforced by the codec on inbound variable-length fields
    pub codec_limits: CodecLimits,
    locked: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        let mut message_kinds = MessageKinds::new();
        message_kinds.add_message::<Ping>();
        message_kinds.add_message::<Pong>();
        message_kinds.add_message::<InterestMessage>();
        message_kinds.add_message::<LostInterestMessage>();

        Self {
            message_kinds,
            tick_interval: Duration::from_millis(50),
            codec_limits: CodecLimits::default(),
            locked: false,
        }
    }
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn tick_interval(&mut self, duration: Duration) -> &mut Self {
        self.check_lock();
        self.tick_interval = duration;
        self
    }

    pub fn codec_limits(&mut self, limits: CodecLimits) -> &mut Self {
        self.check_lock();
        self.codec_limits = limits;
        self
    }

    pub fn add_message<M: Message + Named + Serde>(&mut self) -> &mut Self {
        self.check_lock();
        self.message_kinds.add_message::<M>();
        self
    }

    /// Registers a message kind that a connection may only send after it has
    /// been authenticated
    pub fn add_message_with_auth<M: Message + Named + Serde>(&mut self) -> &mut Self {
        self.check_lock();
        self.message_kinds.add_message_with_auth::<M>(true);
        self
    }

    // Non-panicking builder methods

    pub fn try_tick_interval(&mut self, duration: Duration) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.tick_interval = duration;
        Ok(self)
    }

    pub fn try_codec_limits(&mut self, limits: CodecLimits) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.codec_limits = limits;
        Ok(self)
    }

    pub fn try_add_message<M: Message + Named + Serde>(
        &mut self,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.message_kinds.add_message::<M>();
        Ok(self)
    }

    pub fn try_add_message_with_auth<M: Message + Named + Serde>(
        &mut self,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.message_kinds.add_message_with_auth::<M>(true);
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    /// Checks if protocol is locked without panicking
    /// Returns Err if protocol is locked
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
