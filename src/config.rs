//! Server configuration.
//!
//! Loaded from a YAML file when `WEBROOT_CONFIG` names one, otherwise built
//! from defaults. `LISTEN` always overrides the listen address.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::http::reader::ReadLimits;

const CONFIG_ENV: &str = "WEBROOT_CONFIG";
const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// How long a single read on a client socket may wait, in milliseconds
    pub client_timeout_ms: u64,
    pub max_line_length: usize,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let limits = ReadLimits::default();
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            client_timeout_ms: limits.read_timeout.as_millis() as u64,
            max_line_length: limits.max_line_length,
            max_body_bytes: limits.max_body_bytes,
        }
    }
}

impl ServerConfig {
    pub fn read_limits(&self) -> ReadLimits {
        ReadLimits {
            read_timeout: Duration::from_millis(self.client_timeout_ms),
            max_line_length: self.max_line_length,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory served for paths with no dedicated endpoint
    pub root_dir: PathBuf,
    /// Upload directory, relative to `root_dir`
    pub uploads_dir: PathBuf,
    /// Extra extension to MIME type mappings, merged over the built-in table
    pub content_types: HashMap<String, String>,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("webroot"),
            uploads_dir: PathBuf::from("uploaded_imgs"),
            content_types: HashMap::new(),
        }
    }
}

impl Config {
    /// Loads the configuration from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let cfg = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        Ok(cfg.with_listen_override(std::env::var(LISTEN_ENV).ok()))
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn with_listen_override(mut self, listen_addr: Option<String>) -> Self {
        if let Some(addr) = listen_addr {
            self.server.listen_addr = addr;
        }
        self
    }
}
