use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    models::{GenericResponse, LoginReq, WorkerResponse},
    state::AppState,
    utils::{AppError, ValidatedBody},
};

/// Login endpoint
///
/// Record the login of an existing worker whose mobile number was just verified
/// and return the worker record
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Login recorded", body = WorkerResponse),
        (status = 403, description = "Mobile number not verified", body = GenericResponse),
        (status = 404, description = "No worker with the mobile number", body = GenericResponse),
    ),
    tag = "Registration API"
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    ValidatedBody(body): ValidatedBody<LoginReq>,
) -> Result<Json<WorkerResponse>, AppError> {
    let worker = state.registration.record_login(&body.mobile).await?;
    let res = WorkerResponse {
        success: true,
        data: worker,
    };
    Ok(Json(res))
}
