//! Rate limiting middleware.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::{net::SocketAddr, num::NonZeroU32, sync::Arc, time::Duration};

use crate::web::error::ApiError;

/// Per-IP rate limiter.
pub type IpRateLimiter = DefaultKeyedRateLimiter<String>;

/// State for rate limiting.
pub struct RateLimitState {
    /// Limiter for the login endpoint.
    login: IpRateLimiter,
    /// Limiter for general API endpoints.
    api: IpRateLimiter,
    /// Login rate limit (requests per minute).
    login_rate_limit: u32,
    /// API rate limit (requests per minute).
    api_rate_limit: u32,
}

fn per_minute(requests: u32) -> IpRateLimiter {
    RateLimiter::keyed(Quota::per_minute(
        NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN),
    ))
}

impl RateLimitState {
    /// Create a new rate limit state.
    pub fn new(login_rate_limit: u32, api_rate_limit: u32) -> Self {
        Self {
            login: per_minute(login_rate_limit),
            api: per_minute(api_rate_limit),
            login_rate_limit,
            api_rate_limit,
        }
    }

    /// Check if a request is allowed for the login endpoint.
    pub fn check_login(&self, ip: &str) -> bool {
        self.login.check_key(&ip.to_string()).is_ok()
    }

    /// Check if a request is allowed for general API endpoints.
    pub fn check_api(&self, ip: &str) -> bool {
        self.api.check_key(&ip.to_string()).is_ok()
    }

    /// Drop per-IP state that has fully replenished.
    pub fn cleanup(&self) {
        self.login.retain_recent();
        self.login.shrink_to_fit();
        self.api.retain_recent();
        self.api.shrink_to_fit();
    }

    /// Start a background task to periodically clean up old entries.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            interval.tick().await;
            loop {
                interval.tick().await;
                self.cleanup();
                tracing::debug!(
                    login_keys = self.login.len(),
                    api_keys = self.api.len(),
                    "Rate limiter state pruned"
                );
            }
        });
    }
}

/// Extract client IP from request.
pub fn get_client_ip(req: &Request<Body>) -> String {
    // Reverse proxy headers first
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    if let Some(real_ip) = req
        .headers()
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
    {
        return real_ip.trim().to_string();
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Rate limiting middleware for the login endpoint.
pub async fn login_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = get_client_ip(&req);

    if !state.check_login(&ip) {
        tracing::warn!(ip = %ip, limit = state.login_rate_limit, "Login rate limit exceeded");
        return ApiError::too_many_requests("Too many login attempts. Please try again later.")
            .into_response();
    }

    next.run(req).await
}

/// Rate limiting middleware for general API endpoints.
pub async fn api_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = get_client_ip(&req);

    if !state.check_api(&ip) {
        tracing::warn!(ip = %ip, limit = state.api_rate_limit, "API rate limit exceeded");
        return ApiError::too_many_requests("Too many requests. Please try again later.")
            .into_response();
    }

    next.run(req).await
}
