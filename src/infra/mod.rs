pub mod broker_client;
pub mod config;
pub mod telemetry;
