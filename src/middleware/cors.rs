use axum::http::{HeaderName, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

fn allowed_headers() -> Vec<HeaderName> {
    vec![
        HeaderName::from_static("content-type"),
        HeaderName::from_static("authorization"),
        HeaderName::from_static("x-requested-with"),
        HeaderName::from_static(super::CORRELATION_ID_HEADER),
    ]
}

/// Create CORS layer with configurable origins from settings.
///
/// `*` (or an empty list) mirrors the request origin so credentialed browser
/// requests still receive an explicit `Access-Control-Allow-Origin`.
pub fn create_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(allowed_headers());

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        tracing::debug!("CORS: mirroring request origin");
        return base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true);
    }

    let origins: Vec<_> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(parsed) => {
                tracing::debug!("CORS: Allowing origin: {}", origin);
                Some(parsed)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS: No valid origins configured, falling back to permissive mode");
        return base.allow_origin(Any).allow_credentials(false);
    }

    base.allow_origin(origins).allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn preflight(origins: &[String], origin: &str) -> Option<String> {
        let app = Router::new()
            .route("/api/evidence", get(|| async { "ok" }))
            .layer(create_cors_layer(origins));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/evidence")
                    .header(header::ORIGIN, origin)
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_wildcard_mirrors_origin() {
        let allowed = preflight(&["*".to_string()], "http://localhost:3000").await;
        assert_eq!(allowed.as_deref(), Some("http://localhost:3000"));
    }

    #[tokio::test]
    async fn test_explicit_origins() {
        let origins = vec!["https://odonto.example".to_string()];
        assert_eq!(
            preflight(&origins, "https://odonto.example").await.as_deref(),
            Some("https://odonto.example")
        );
        assert_eq!(preflight(&origins, "https://evil.example").await, None);
    }
}
