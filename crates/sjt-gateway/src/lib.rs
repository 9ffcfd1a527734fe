//! sjt-gateway: persistence gateways and configuration.
//!
//! Implements the `PersistenceGateway` trait for Google Sheets, an in-memory
//! mock and a demo mode, and loads the survey's startup configuration.

pub mod config;
pub mod demo;
pub mod error;
pub mod mock;
pub mod sheets;

pub use config::{create_gateway, load_config, load_config_from, GatewayConfig, SurveyConfig};
pub use error::GatewayError;
