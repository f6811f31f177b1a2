//! Security headers middleware.

use axum::{
    body::Body,
    http::{header, header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Headers set on every response.
fn security_header_values() -> [(HeaderName, HeaderValue); 4] {
    [
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (header::X_XSS_PROTECTION, HeaderValue::from_static("0")),
    ]
}

/// Add security headers, and mark responses uncacheable unless the handler
/// already chose a cache policy. Session tokens travel in response bodies.
pub async fn security_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in security_header_values() {
        headers.insert(name, value);
    }
    headers
        .entry(header::CACHE_CONTROL)
        .or_insert(HeaderValue::from_static("no-store"));

    response
}
