pub mod server;
pub mod server_config;
pub mod time_manager;
