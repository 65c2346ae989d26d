use axum::{http::StatusCode, Router};
use serde_json::json;
use tower::ServiceExt;

use mwap_backend::models::{SendOtpResponse, VerifyOtpResponse, WorkerResponse};

use crate::helper::helper::{build_post_request, read_json};

pub fn registrant_json(mobile: &str, national_id: &str) -> serde_json::Value {
    json!({
        "name": "Ramesh Yadav",
        "age": 29,
        "gender": "male",
        "workingCategory": "construction",
        "migrationPlace": "Pune",
        "mobile": mobile,
        "nationalId": national_id,
    })
}

pub async fn send_otp(app: Router, phone: &str) -> SendOtpResponse {
    let body = json!({ "phoneNumber": phone }).to_string();
    let request = build_post_request("/api/v1/otp/send", &body);
    let res = app.oneshot(request).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let response: SendOtpResponse = read_json(res).await;
    assert_eq!(response.success, true);
    response
}

pub async fn verify_otp(app: Router, phone: &str, code: &str) -> VerifyOtpResponse {
    let body = json!({ "phoneNumber": phone, "code": code }).to_string();
    let request = build_post_request("/api/v1/otp/verify", &body);
    let res = app.oneshot(request).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    read_json(res).await
}

/// Send and verify an otp, which allows one registration or login of the mobile
pub async fn verify_mobile(app: Router, mobile: &str) {
    let sent = send_otp(app.clone(), mobile).await;
    let code = sent.code.expect("test state exposes otp codes");
    let verified = verify_otp(app, mobile, &code).await;
    assert_eq!(verified.valid, true);
}

/// Send, verify and commit a registrant through the api
pub async fn register_worker(app: Router, mobile: &str, national_id: &str) -> WorkerResponse {
    verify_mobile(app.clone(), mobile).await;
    let body = json!({ "registrant": registrant_json(mobile, national_id) }).to_string();
    let request = build_post_request("/api/v1/registration", &body);
    let res = app.oneshot(request).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    read_json(res).await
}
