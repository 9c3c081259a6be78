//! Verification server.

use crate::routes::create_router;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Errors from the verification server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Configuration for the verification server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    /// Port to listen on. `0` picks a free port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Handle for a server started in the background.
pub struct ServerHandle {
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Base URL for clients, e.g. `http://127.0.0.1:8080`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Abort the server.
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The verification HTTP service.
pub struct VerifyServer {
    config: ServerConfig,
}

impl VerifyServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    async fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr = self.config.listen_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })
    }

    /// Start serving in a background task.
    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let listener = self.bind().await?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "Verification server listening");

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, create_router()).await {
                error!(error = ?e, "Verification server error");
            }
        });

        Ok(ServerHandle { local_addr, task })
    }

    /// Serve until `shutdown` resolves, then finish in-flight requests.
    pub async fn serve_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        info!(addr = %listener.local_addr()?, "Verification server listening");

        axum::serve(listener, create_router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Verification server stopped");
        Ok(())
    }
}
