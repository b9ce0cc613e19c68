pub mod batch;
pub mod error;
pub mod message;
pub mod message_kinds;
pub mod named;
pub mod request;
pub mod system_messages;
pub mod unbatcher;
