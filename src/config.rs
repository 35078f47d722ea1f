//! Server configuration.
//!
//! Settings come from an optional TOML file plus `JOBPULSE_`-prefixed
//! environment overrides, with built-in defaults for local development.

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Runtime settings for the notification service.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Allowed CORS origins. Empty means allow any (development).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Settings {
    /// Load settings, optionally from an explicit config file path.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8090i64)?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path).format(FileFormat::Toml)),
            None => builder.add_source(File::with_name("jobpulse").required(false)),
        };

        builder
            .add_source(Environment::with_prefix("JOBPULSE"))
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("deserializing configuration")
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
