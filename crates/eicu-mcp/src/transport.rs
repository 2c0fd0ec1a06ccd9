//! Serving loops for the supported transports.

use rmcp::ServiceExt;
use rmcp::transport::stdio;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{ServerConfig, Transport};
use crate::error::ServerError;
use crate::server::EicuDataServer;

/// Serves until the client disconnects (stdio) or Ctrl-C (HTTP).
pub async fn serve(server: EicuDataServer, config: &ServerConfig) -> Result<(), ServerError> {
    match config.transport {
        Transport::Http => serve_http(server, config).await,
        Transport::Stdio => serve_stdio(server).await,
    }
}

pub async fn serve_http(server: EicuDataServer, config: &ServerConfig) -> Result<(), ServerError> {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            stateful_mode: !config.stateless,
            ..Default::default()
        },
    );

    let path = config.mount_path();
    // axum refuses to nest at the root.
    let router = if path == "/" {
        axum::Router::new().fallback_service(service)
    } else {
        axum::Router::new().nest_service(&path, service)
    };

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

    info!(
        %address,
        path = %path,
        stateless = config.stateless,
        "serving MCP over streamable HTTP"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Http)?;

    info!("server shutdown complete");
    Ok(())
}

/// Logging must already be directed at stderr; stdout carries the protocol.
pub async fn serve_stdio(server: EicuDataServer) -> Result<(), ServerError> {
    let running = server
        .serve(stdio())
        .await
        .map_err(|e| ServerError::Initialize(e.to_string()))?;

    info!("server ready, waiting for requests on stdio");

    let reason = running
        .waiting()
        .await
        .map_err(|e| ServerError::Session(e.to_string()))?;

    info!(?reason, "server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
