use axum::http::StatusCode;
use tower::ServiceExt; // for `oneshot` and `ready`

use mwap_backend::{app::build_app, models::GenericResponse};

mod helper;

use helper::{build_get_request, read_json, test_state};

#[tokio::test]
async fn test_default_route() {
    let (state, _) = test_state();
    let app = build_app(state);
    let res = app.oneshot(build_get_request("/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res: GenericResponse = read_json(res).await;
    assert_eq!(res.success, true);
    assert_eq!(res.message, "Server is running".to_owned());
}

#[tokio::test]
async fn test_ping_route() {
    let (state, _) = test_state();
    let app = build_app(state);
    let res = app.oneshot(build_get_request("/api/v1/ping")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res: GenericResponse = read_json(res).await;
    assert_eq!(res.success, true);
    assert_eq!(res.message.as_str(), "Server running successfully!");
}

#[tokio::test]
async fn test_unknown_route() {
    let (state, _) = test_state();
    let app = build_app(state);
    let req = build_get_request("/api/v1/a-not-exiting-path");
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res: GenericResponse = read_json(res).await;
    assert_eq!(res.success, false);
}

#[tokio::test]
async fn test_openapi_document() {
    let (state, _) = test_state();
    let app = build_app(state);
    let req = build_get_request("/api-docs/openapi.json");
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let doc: serde_json::Value = read_json(res).await;
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/v1/otp/send"));
    assert!(paths.contains_key("/api/v1/otp/verify"));
    assert!(paths.contains_key("/api/v1/registration"));
    assert!(paths.contains_key("/api/v1/registration/check"));
    assert!(paths.contains_key("/api/v1/login"));
}
