pub mod configuration;
pub mod http_client;
pub mod telemetry;
