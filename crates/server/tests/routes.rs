//! HTTP surface smoke tests over the in-memory gateway.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use tower::ServiceExt;

use tillpoint_server::config::{GatewayConfig, ServerConfig};
use tillpoint_server::gateway::MemoryGateway;
use tillpoint_server::state::AppState;

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        gateway: GatewayConfig {
            url: "http://gateway.invalid".to_string(),
            service_key: SecretString::from("kJ8#mQ2@vX5!bN9$wR4%tY7&uI3*oP6"),
        },
        sentry_dsn: None,
    }
}

fn test_app() -> axum::Router {
    let state = AppState::with_gateway(test_config(), Arc::new(MemoryGateway::new()));
    tillpoint_server::app(state)
}

#[tokio::test]
async fn test_health_returns_ok() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_page_is_public() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unauthenticated_pages_redirect_to_login() {
    for path in ["/", "/products", "/transactions", "/reports"] {
        let response = test_app()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path {path}");
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/auth/login"),
            "path {path}"
        );
    }
}

#[tokio::test]
async fn test_unauthenticated_mutation_redirects_to_login() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/products")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("name=Aqua&price=1.50&stock_quantity=5"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_login_with_bad_credentials_rerenders_form() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "email=cashier%40example.com&password=nope",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    // Bad credentials stay on the form with a message, not a redirect.
    assert_eq!(response.status(), StatusCode::OK);
}
