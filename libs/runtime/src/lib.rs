//! Runtime support for the server binary: layered configuration and logging.

pub mod config;
pub mod logging;

pub use config::{AppConfig, CliArgs, DatabaseConfig, LoggingConfig, ServerConfig};
pub use logging::init_logging_from_config;
