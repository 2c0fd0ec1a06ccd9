//! Server configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Streamable HTTP, mounted at [`ServerConfig::path`].
    #[default]
    Http,
    Stdio,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Name reported in the MCP handshake.
    pub name: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub transport: Transport,
    /// Serve without per-client sessions.
    pub stateless: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "eicu-data".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8001,
            path: "/mcp".to_string(),
            transport: Transport::Http,
            stateless: true,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The mount path with a leading slash.
    pub fn mount_path(&self) -> String {
        let trimmed = self.path.trim();
        if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        }
    }
}
