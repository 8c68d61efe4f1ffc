//! Liveness router tests
//!
//! Run with: cargo test --test liveness_test

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

use kinogate::core::web_server::{liveness_router, LIVENESS_BODY};

async fn call(method: Method, uri: &str) -> (StatusCode, String) {
    let response = liveness_router()
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_root_answers_any_method() {
    for method in [Method::GET, Method::POST, Method::HEAD] {
        let (status, body) = call(method.clone(), "/").await;
        assert_eq!(status, StatusCode::OK, "{} /", method);
        if method != Method::HEAD {
            assert_eq!(body, LIVENESS_BODY);
        }
    }
}

#[tokio::test]
async fn test_health_path() {
    let (status, body) = call(Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let (status, _) = call(Method::GET, "/s/abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
