use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("HTTP server failed: {0}")]
    Http(#[source] io::Error),

    #[error("MCP session failed to initialize: {0}")]
    Initialize(String),

    #[error("MCP session ended abnormally: {0}")]
    Session(String),
}
