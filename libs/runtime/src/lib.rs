//! Runtime support for the Bookmart server: layered configuration loading
//! and multi-section logging setup.

pub mod config;
pub mod logging;

pub use config::{AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section, ServerConfig};
