//! Application configuration.
//!
//! Values are resolved from, highest precedence first: command-line flags,
//! the TOML file given with `--config`, and the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eicu_mcp::{ServerConfig, Transport};
use eicu_transform::BuildOptions;
use serde::{Deserialize, Serialize};

/// Default name of the merged table written by `build` and `serve`.
pub const DEFAULT_OUTPUT_FILE: &str = "complete_patient_data.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the five eICU source files.
    pub data_dir: PathBuf,
    /// Where the merged table is written.
    pub output: PathBuf,
    pub build: BuildOptions,
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("eicu_demo_data"),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            build: BuildOptions::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Build-related flags; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct BuildOverrides {
    pub data_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Server flags; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub transport: Option<Transport>,
}

impl AppConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Reads `path`, or returns the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&source)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    pub fn apply_build_overrides(&mut self, overrides: BuildOverrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
    }

    pub fn apply_server_overrides(&mut self, overrides: ServerOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(path) = overrides.path {
            self.server.path = path;
        }
        if let Some(transport) = overrides.transport {
            self.server.transport = transport;
        }
    }
}
