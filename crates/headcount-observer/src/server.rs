//! Observer HTTP server lifecycle management.
//!
//! [`start_server`] binds to a TCP port and runs the Axum server in the
//! foreground; [`spawn_observer`] launches it on a background Tokio task
//! so the engine binary can run it alongside the change listener.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Configuration for the Observer server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
        }
    }
}

/// Errors that can occur when starting or running the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Start the Observer HTTP server in the foreground.
///
/// Binds to the configured address, builds the router, and serves
/// requests until the process is terminated.
///
/// # Errors
///
/// Returns [`ServerError`] if the TCP listener cannot bind or the server
/// encounters a fatal I/O error.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;

    let router = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "Observer server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    Ok(())
}

/// Spawn the Observer HTTP server on a background Tokio task.
///
/// Binds to `0.0.0.0:{port}` and serves the REST API plus the
/// `WebSocket` aggregate stream. Returns a [`JoinHandle`] so the caller
/// can manage the server's lifecycle alongside the change listener; the
/// task runs until the runtime shuts down or the handle is aborted.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be parsed. Bind
/// failures on the actual socket surface as an error log from the
/// background task.
pub async fn spawn_observer(
    port: u16,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, ServerError> {
    let config = ServerConfig {
        host: String::from("0.0.0.0"),
        port,
    };

    // Catch obvious misconfigurations before spawning the task.
    let addr_str = format!("{}:{}", config.host, config.port);
    let _: SocketAddr = addr_str
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address {addr_str}: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = start_server(&config, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    info!(port, "Observer server spawned on background task");

    Ok(handle)
}
