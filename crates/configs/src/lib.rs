//! fritter/crates/configs/src/lib.rs
//!
//! Layered runtime configuration: built-in defaults, then an optional
//! `Fritter.toml`, then `FRITTER_*` environment variables (`__` as the
//! nesting separator, e.g. `FRITTER_DATABASE__URL`). A `.env` file is
//! honored when present.

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Connection string; kept secret so it never lands in logs.
    pub url: SecretString,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    /// The character limit of a single freet, and therefore of every
    /// splitter segment.
    pub max_segment_len: usize,
    pub log_filter: String,
    pub database: DatabaseSettings,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Config::builder()
            .set_default("bind_addr", "127.0.0.1:8080")?
            .set_default("max_segment_len", 140_i64)?
            .set_default("log_filter", "info")?
            .set_default("database.url", "sqlite:fritter.db")?
            .add_source(File::with_name("Fritter").required(false))
            .add_source(Environment::with_prefix("FRITTER").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_load_without_any_sources() {
        let settings = Settings::load().unwrap();
        assert_eq!(settings.bind_addr, "127.0.0.1:8080");
        assert_eq!(settings.max_segment_len, 140);
        assert_eq!(settings.database.url.expose_secret(), "sqlite:fritter.db");
    }
}
