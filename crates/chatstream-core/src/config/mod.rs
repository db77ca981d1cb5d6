//! Configuration management
//!
//! Configuration is composed from defaults, an optional JSON or TOML file,
//! the environment (including a `.env` file) and command-line overrides, in
//! that order.

mod env_loader;
mod file_loader;
mod loader;
mod logging_config;
mod model;

pub use env_loader::apply_env;
pub use file_loader::{load_from_file, save_to_file};
pub use loader::{ConfigLoader, ConfigSource};
pub use logging_config::{LogFormat, LoggingConfig};
pub use model::{Config, ModelSettings, ProviderConfig, StorageConfig};
