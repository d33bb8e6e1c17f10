use super::*;
use crate::downloader::test_helpers::{
    TS, create_test_mirror, create_test_mirror_with, mount_capture, mount_index,
};
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use std::time::Duration;
use tower::ServiceExt;


/// Router over a mirror that talks to `server`, plus the backups tempdir
async fn create_test_app() -> (Router, wiremock::MockServer, tempfile::TempDir) {
    let (mirror, server, backups) = create_test_mirror().await;
    let config = Arc::new(mirror.config().clone());
    (create_router(Arc::new(mirror), config), server, backups)
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_api_server_stops_on_shutdown() {
    let (mirror, _server, _backups) = create_test_mirror().await;

    // Port 0 = OS assigns a free port
    let mut config = mirror.config().clone();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);

    let shutdown = CancellationToken::new();
    let api_handle = tokio::spawn(start_api_server(
        Arc::new(mirror),
        config,
        shutdown.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), api_handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_api_server_reports_bind_failure() {
    let (mirror, _server, _backups) = create_test_mirror().await;

    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = mirror.config().clone();
    config.api.bind_address = taken.local_addr().unwrap();

    let result = start_api_server(
        Arc::new(mirror),
        Arc::new(config),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(crate::Error::Io(_))));
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _server, _backups) = create_test_app().await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:8080")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let (mirror, _server, _backups) = create_test_mirror_with(|config| {
        config.api.cors_origins = vec!["http://allowed.test".to_string()];
    })
    .await;
    let config = Arc::new(mirror.config().clone());
    let app = create_router(Arc::new(mirror), config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://allowed.test")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://allowed.test"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (mirror, _server, _backups) = create_test_mirror_with(|config| {
        config.api.cors_enabled = false;
    })
    .await;
    let config = Arc::new(mirror.config().clone());
    let app = create_router(Arc::new(mirror), config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:8080")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}
