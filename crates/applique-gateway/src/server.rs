use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;

use crate::error::GatewayError;
use crate::router::build_router;
use crate::service::QueryService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub service: Arc<dyn QueryService>,
    pub started_at: Instant,
}

pub struct GatewayServer {
    addr: SocketAddr,
    auth_token: Option<String>,
    rate_limit: u32,
    max_body_size: usize,
    service: Arc<dyn QueryService>,
    shutdown_rx: watch::Receiver<bool>,
}

impl GatewayServer {
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidAddress`] if `bind:port` is not a socket address.
    pub fn new(
        bind: &str,
        port: u16,
        service: Arc<dyn QueryService>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Result<Self, GatewayError> {
        let raw = format!("{bind}:{port}");
        let addr: SocketAddr = raw
            .parse()
            .map_err(|e| GatewayError::InvalidAddress(raw.clone(), e))?;

        if addr.ip().is_unspecified() {
            tracing::warn!(%addr, "gateway binding to all interfaces");
        }

        Ok(Self {
            addr,
            auth_token: None,
            rate_limit: 120,
            max_body_size: 65_536,
            service,
            shutdown_rx,
        })
    }

    #[must_use]
    pub fn with_auth(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, limit: u32) -> Self {
        self.rate_limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until the shutdown channel flips to `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or encounters a fatal I/O error.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let state = AppState {
            service: self.service,
            started_at: Instant::now(),
        };

        let router = build_router(state, self.auth_token, self.rate_limit, self.max_body_size);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Bind(self.addr.to_string(), e))?;
        tracing::info!(addr = %self.addr, "gateway listening");

        let mut shutdown_rx = self.shutdown_rx;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            while !*shutdown_rx.borrow_and_update() {
                if shutdown_rx.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
            tracing::info!("gateway shutting down");
        })
        .await
        .map_err(|e| GatewayError::Server(format!("{e}")))?;

        Ok(())
    }
}
