//! Configuration for the transfer subsystem
//!
//! Loaded once by the embedding server from an optional `config.toml`,
//! with environment overrides under the `FERRO_FTP` prefix. Defaults are
//! baked in so the crate also works unconfigured, as it does in tests.

use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct TransferConfig {
    /// Root directory served to clients
    pub server_root: String,

    /// Bound on the passive-connection rendezvous wait, in seconds
    pub passive_wait_secs: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            server_root: "./server_root".to_string(),
            passive_wait_secs: 60,
        }
    }
}

impl TransferConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("server_root", defaults.server_root)?
            .set_default("passive_wait_secs", defaults.passive_wait_secs)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("FERRO_FTP"))
            .build()?;

        let config: TransferConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server_root.is_empty() {
            return Err(ConfigError::Message("server_root cannot be empty".into()));
        }
        if self.passive_wait_secs == 0 {
            return Err(ConfigError::Message(
                "passive_wait_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Rendezvous wait bound as a `Duration`
    pub fn passive_wait(&self) -> Duration {
        Duration::from_secs(self.passive_wait_secs)
    }

    /// Server root as a `PathBuf`
    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }
}
