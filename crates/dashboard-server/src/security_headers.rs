use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

/// Scripts come from this origin plus the Plotly CDN; the page talks back over
/// same-origin HTTP and WebSocket only.
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     script-src 'self' https://cdn.plot.ly; \
     style-src 'self' 'unsafe-inline'; \
     img-src 'self' data:; \
     connect-src 'self' ws: wss:; \
     frame-ancestors 'none'";

/// Adds OWASP-recommended security headers to every response.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert("x-xss-protection", HeaderValue::from_static("0"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    // Figures are recomputed per session
    headers.insert("cache-control", HeaderValue::from_static("no-store"));

    response
}
