//! Web server for the academy API.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::{AcademyError, Database, Result};

use super::handlers::AppState;
use super::middleware::LoginRateLimit;
use super::router::create_router;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Shared login limiter.
    login_limit: Arc<LoginRateLimit>,
    /// CORS allowed origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, db: Database) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| AcademyError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(db, &config.auth)),
            login_limit: Arc::new(
                LoginRateLimit::new(config.server.login_rate_limit)
                    .trust_proxy_headers(config.server.trust_proxy_headers),
            ),
            cors_origins: config.server.cors_origins.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build the full application router.
    pub fn router(&self) -> Router {
        create_router(
            self.app_state.clone(),
            self.login_limit.clone(),
            &self.cors_origins,
        )
        .layer(CompressionLayer::new())
    }

    async fn bind(self) -> std::io::Result<(TcpListener, Router)> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;

        self.login_limit.start_cleanup_task();
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        Ok((listener, router))
    }

    /// Run the web server.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.bind().await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
