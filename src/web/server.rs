//! Web server for fileshare.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::auth::cleanup_expired_sessions;
use crate::config::{Config, RetentionConfig};
use crate::file::sweep;
use crate::{FileshareError, Result};

use super::handlers::AppState;
use super::middleware::RateLimitState;
use super::openapi::create_swagger_router;
use super::router::{create_health_router, create_router};

/// Session cleanup interval: 1 hour.
const SESSION_CLEANUP_INTERVAL_SECS: u64 = 3600;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Per-IP rate limiters.
    rate_limit: Arc<RateLimitState>,
    /// CORS allowed origins.
    cors_origins: Vec<String>,
    /// Retention sweep settings.
    retention: RetentionConfig,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.web.host, config.web.port)
            .parse()
            .map_err(|e| FileshareError::Config(format!("invalid web server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            rate_limit: Arc::new(RateLimitState::new(
                config.web.login_rate_limit,
                config.web.api_rate_limit,
            )),
            cors_origins: config.web.cors_origins.clone(),
            retention: config.retention.clone(),
        })
    }

    /// Override the bind address.
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Full application router.
    fn router(&self) -> Router {
        create_router(
            self.app_state.clone(),
            self.rate_limit.clone(),
            &self.cors_origins,
        )
        .merge(create_health_router())
        .merge(create_swagger_router())
        .layer(CompressionLayer::new())
    }

    /// Start the session cleanup background task.
    fn start_session_cleanup_task(state: Arc<AppState>) {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(SESSION_CLEANUP_INTERVAL_SECS));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                match cleanup_expired_sessions(state.db.pool()).await {
                    Ok(count) if count > 0 => {
                        tracing::info!(deleted_count = count, "Cleaned up expired sessions");
                    }
                    Ok(_) => tracing::debug!("No expired sessions to clean up"),
                    Err(e) => tracing::warn!(error = %e, "Failed to cleanup sessions"),
                }
            }
        });
    }

    /// Start the periodic retention sweep.
    fn start_retention_task(state: Arc<AppState>, retention: RetentionConfig) {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(retention.interval_secs.max(1)));

            loop {
                interval.tick().await;

                if let Err(e) =
                    sweep(state.db.pool(), &*state.images, retention.max_age_days).await
                {
                    tracing::warn!(error = %e, "Retention sweep failed");
                }
            }
        });
    }

    /// Bind the listener and start the background tasks.
    async fn bind(&self) -> std::io::Result<(TcpListener, SocketAddr)> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        // Background tasks start only after a successful bind
        Self::start_session_cleanup_task(self.app_state.clone());
        tracing::info!("Session cleanup task started (runs every hour)");

        self.rate_limit.clone().start_cleanup_task();

        if self.retention.enabled {
            Self::start_retention_task(self.app_state.clone(), self.retention.clone());
            tracing::info!(
                max_age_days = self.retention.max_age_days,
                interval_secs = self.retention.interval_secs,
                "Retention sweep task started"
            );
        }

        tracing::info!("Web server listening on http://{}", local_addr);
        Ok((listener, local_addr))
    }

    /// Run the web server.
    pub async fn run(self) -> std::io::Result<()> {
        let router = self.router();
        let (listener, _) = self.bind().await?;

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
        let router = self.router();
        let (listener, local_addr) = self.bind().await?;

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
