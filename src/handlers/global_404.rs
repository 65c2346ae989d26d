use axum::http::Uri;
use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::models::GenericResponse;

pub async fn global_404_handler(uri: Uri) -> impl IntoResponse {
    let msg = format!("Route `{}` does not exist", uri);
    tracing::debug!(msg);
    let response = GenericResponse {
        success: false,
        message: msg,
    };
    (StatusCode::NOT_FOUND, Json(response))
}
