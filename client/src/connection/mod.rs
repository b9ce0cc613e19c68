pub mod connection;
pub mod time_manager;
