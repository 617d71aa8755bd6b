// src/settings.rs
//! Runtime configuration.
//!
//! Settings are layered, later sources overriding earlier ones:
//! 1. Built-in defaults
//! 2. Optional `registry.toml` (or any format `config` understands) in the working directory
//! 3. Environment variables prefixed with `REGISTRY_` (a `.env` file is loaded first)
//!
//! ## Keys
//! - `bind_addr`: API listen address (default `127.0.0.1:3000`)
//! - `jwt_secret`: HS256 secret shared with the token issuer (required)
//! - `event_log_path`: Event journal file; the registry is memory-only when unset
//! - `log_level`: Default log filter when `RUST_LOG` is not set (default `info`)

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    #[serde(default)]
    pub event_log_path: Option<PathBuf>,
    pub log_level: String,
}

impl RegistryConfig {
    /// Loads configuration from the default file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("registry").required(false))
                .add_source(Environment::with_prefix("REGISTRY")),
        )
    }

    /// Applies defaults beneath the given sources and validates the result.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: RegistryConfig = builder
            .set_default("bind_addr", "127.0.0.1:3000")?
            .set_default("log_level", "info")?
            .build()?
            .try_deserialize()?;

        if config.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt_secret must not be empty".into()));
        }
        Ok(config)
    }
}
