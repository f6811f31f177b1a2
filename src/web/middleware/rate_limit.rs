//! Login rate limiting.
//!
//! Both login endpoints share one per-IP quota.

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

/// Per-IP login limiter.
pub struct LoginRateLimit {
    limiter: DefaultKeyedRateLimiter<String>,
    trust_proxy_headers: bool,
}

impl LoginRateLimit {
    /// Allow `per_minute` login attempts per client IP.
    pub fn new(per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::keyed(quota),
            trust_proxy_headers: false,
        }
    }

    /// Take the client IP from forwarding headers when present.
    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// Check and consume one attempt for `ip`.
    pub fn check(&self, ip: &str) -> bool {
        self.limiter.check_key(&ip.to_string()).is_ok()
    }

    /// Start a background task that forgets idle clients.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                self.limiter.retain_recent();
                self.limiter.shrink_to_fit();
            }
        });
    }
}

/// Extract client IP from request.
///
/// Forwarding headers are client-controlled, so they are read only when
/// `trust_proxy_headers` is set. Otherwise the peer address is used.
fn client_ip(req: &Request<Body>, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(forwarded) = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
        {
            if let Some(ip) = forwarded.split(',').next() {
                return ip.trim().to_string();
            }
        }

        if let Some(real_ip) = req
            .headers()
            .get("X-Real-IP")
            .and_then(|v| v.to_str().ok())
        {
            return real_ip.trim().to_string();
        }
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Rate limiting middleware for the login endpoints.
pub async fn login_rate_limit(
    state: Arc<LoginRateLimit>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req, state.trust_proxy_headers);

    if !state.check(&ip) {
        tracing::warn!(ip = %ip, "Login rate limit exceeded");
        return ApiError::too_many_requests("Too many login attempts. Please try again later.")
            .into_response();
    }

    next.run(req).await
}
