pub mod bandwidth_monitor;
pub mod base_connection;
pub mod connection_config;
pub mod connection_state;
pub mod moving_average;
