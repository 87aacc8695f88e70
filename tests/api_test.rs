use std::collections::HashMap;

use axum::{
    Extension,
    extract::Query,
    http::{StatusCode, header::LOCATION},
};
use spotidash::{api, management::SessionManager};

// The callback handler never reads provider configuration on the
// missing-code path, so these tests run without any environment set; a
// token exchange attempt would panic on the missing client id.

#[tokio::test]
async fn test_callback_without_code_redirects_to_error() {
    let session = SessionManager::new();

    let response = api::callback(Query(HashMap::new()), Extension(session.clone())).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/error");
    // No exchange happened, so no session was installed
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_callback_with_empty_code_redirects_to_error() {
    let session = SessionManager::new();
    let mut params = HashMap::new();
    params.insert("code".to_string(), String::new());

    let response = api::callback(Query(params), Extension(session.clone())).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/error");
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_health_reports_service_identity() {
    let axum::Json(body) = api::health().await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "spotidash");
    assert!(body["version"].is_string());
}
