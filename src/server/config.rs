//! Server configuration
//!
//! Loads `config.toml` (optional) with `RAX_CHAT_*` environment overrides on
//! top of built-in defaults, then validates the result.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::client::sink::DEFAULT_QUEUE_CAPACITY;

/// Searched in order; later files override earlier ones.
const CONFIG_PATHS: [&str; 2] = [
    "rax-chat-server/config", // Docker: /app/rax-chat-server/config.toml
    "config",                 // Local development: ./config.toml
];

const ENV_PREFIX: &str = "RAX_CHAT";

/// Complete server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// IP address the listener binds to
    pub bind_address: String,

    /// TCP port the listener binds to
    pub port: u16,

    /// Maximum number of registered users at once
    pub max_clients: usize,

    /// Longest accepted inbound line, in bytes
    pub max_frame_length: usize,

    /// Longest accepted username, in characters
    pub max_name_length: usize,

    /// Failed name claims before the connection is dropped (0 = unlimited)
    pub max_name_attempts: usize,

    /// Frames queued for one peer before it is treated as stalled and dropped
    pub max_queued_frames: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 12345,
            max_clients: 64,
            max_frame_length: 1024,
            max_name_length: 32,
            max_name_attempts: 0,
            max_queued_frames: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;
        for path in CONFIG_PATHS {
            builder = builder.add_source(File::with_name(path).required(false));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        Self::finish(builder)
    }

    /// Builder seeded with `ServerConfig::default()` so every key is present.
    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder().add_source(Config::try_from(&ServerConfig::default())?))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Message("bind_address cannot be empty".into()));
        }

        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_frame_length == 0 {
            return Err(ConfigError::Message(
                "max_frame_length must be greater than 0".into(),
            ));
        }

        if self.max_name_length == 0 {
            return Err(ConfigError::Message(
                "max_name_length must be greater than 0".into(),
            ));
        }

        if self.max_queued_frames == 0 {
            return Err(ConfigError::Message(
                "max_queued_frames must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Whether failed name claims are capped
    pub fn name_attempts_limited(&self) -> bool {
        self.max_name_attempts > 0
    }
}
