//! MCP server for the merged eICU patient table.
//!
//! Exposes three tools over a loaded [`eicu_query::QueryTable`]:
//! - `get_schema`: column names, dtypes and row count
//! - `get_head`: the first rows as JSON
//! - `filter_rows`: single-column typed filters
//!
//! The server can be reached over streamable HTTP or stdio.

mod config;
mod error;
mod server;
mod transport;

pub use config::{ServerConfig, Transport};
pub use error::ServerError;
pub use server::{
    DEFAULT_HEAD_ROWS, EicuDataServer, FilterRowsParams, GetHeadParams, MAX_HEAD_ROWS,
};
pub use transport::{serve, serve_http, serve_stdio};
