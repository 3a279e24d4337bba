//! Configuration management for the file action service
//!
//! Built-in defaults are layered under an optional `config.toml` and then
//! environment variables prefixed with `FS_ACTION_`.

use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_STREAM_BUFFER_SIZE: usize = 64 * 1024;
/// Longest path the Windows wide-character APIs accept
pub const DEFAULT_MAX_PATH_LENGTH: usize = 32767;

/// Complete service configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// IP address the HTTP listener binds to
    pub bind_address: String,

    /// Port for the HTTP listener
    pub port: u16,

    /// Bytes read per chunk when streaming file content
    pub stream_buffer_size: usize,

    /// Longest raw path string accepted by the path validator
    pub max_path_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            stream_buffer_size: DEFAULT_STREAM_BUFFER_SIZE,
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from ./config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from the named file (extension optional); the file may be absent
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("stream_buffer_size", DEFAULT_STREAM_BUFFER_SIZE as i64)?
            .set_default("max_path_length", DEFAULT_MAX_PATH_LENGTH as i64)?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("FS_ACTION").try_parsing(true))
            .build()?;

        let config: ServiceConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.bind_address.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.stream_buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "stream_buffer_size must be greater than 0".into(),
            ));
        }

        if self.max_path_length == 0 {
            return Err(config::ConfigError::Message(
                "max_path_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
