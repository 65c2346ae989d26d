use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::{
    models::{CommitRegistrationReq, GenericResponse, WorkerResponse},
    state::AppState,
    utils::{generate_worker_id, AppError, AuthError, ValidatedBody},
};

/// Commit registration endpoint
///
/// Store the registrant as a verified worker. The mobile number must have
/// passed otp verification within the last few minutes.
/// The worker id is generated when the client does not send one
#[utoipa::path(
    post,
    path = "/api/v1/registration",
    request_body = CommitRegistrationReq,
    responses(
        (status = 201, description = "Worker registered", body = WorkerResponse),
        (status = 400, description = "Invalid registrant", body = GenericResponse),
        (status = 403, description = "Mobile number not verified", body = GenericResponse),
        (status = 409, description = "Mobile or national id already registered", body = GenericResponse),
    ),
    tag = "Registration API"
)]
pub async fn commit_registration_handler(
    State(state): State<Arc<AppState>>,
    ValidatedBody(body): ValidatedBody<CommitRegistrationReq>,
) -> Result<(StatusCode, Json<WorkerResponse>), AppError> {
    let registrant = body.registrant.validate().map_err(AuthError::Validation)?;
    let worker_id = body.worker_id.unwrap_or_else(generate_worker_id);
    let worker = state.registration.commit(&registrant, &worker_id).await?;
    let res = WorkerResponse {
        success: true,
        data: worker,
    };
    Ok((StatusCode::CREATED, Json(res)))
}
