use axum::http::HeaderValue;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Headers set on every response. No CSP: the RapiDoc page loads its own scripts.
const BASELINE_HEADERS: &[(&str, &str)] = &[
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    ("Referrer-Policy", "strict-origin-when-cross-origin"),
    ("Permissions-Policy", "geolocation=(), microphone=(), camera=()"),
];

const HSTS: &str = "max-age=31536000; includeSubDomains";

/// Per-deployment header policy, fixed at startup
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityHeaders {
    /// Send HSTS. Only in production, where TLS terminates in front of the service.
    pub hsts: bool,
}

/// Adds the baseline security headers, plus HSTS when the policy asks for it.
pub async fn security_headers_middleware(
    State(policy): State<SecurityHeaders>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for &(name, value) in BASELINE_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    if policy.hsts {
        headers.insert("Strict-Transport-Security", HeaderValue::from_static(HSTS));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn headers_for(policy: SecurityHeaders) -> axum::http::HeaderMap {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(
                policy,
                security_headers_middleware,
            ));

        let response = app
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.headers().clone()
    }

    #[tokio::test]
    async fn test_security_headers_are_added() {
        let headers = headers_for(SecurityHeaders::default()).await;
        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
        assert!(headers.contains_key("Permissions-Policy"));
        assert!(!headers.contains_key("Strict-Transport-Security"));
    }

    #[tokio::test]
    async fn test_hsts_follows_policy() {
        let headers = headers_for(SecurityHeaders { hsts: true }).await;
        assert_eq!(headers.get("Strict-Transport-Security").unwrap(), HSTS);
    }
}
