use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    models::{GenericResponse, UniquenessQuery, UniquenessResponse},
    state::AppState,
    utils::AppError,
};

/// Check registration endpoint
///
/// Tell whether the mobile and / or national id is already registered
#[utoipa::path(
    get,
    path = "/api/v1/registration/check",
    params(UniquenessQuery),
    responses(
        (status = 200, description = "Uniqueness of the queried fields", body = UniquenessResponse),
        (status = 400, description = "Invalid query", body = GenericResponse),
        (status = 503, description = "Worker store unavailable", body = GenericResponse),
    ),
    tag = "Registration API"
)]
pub async fn check_registration_handler(
    State(state): State<Arc<AppState>>,
    params: Query<UniquenessQuery>,
) -> Result<Json<UniquenessResponse>, AppError> {
    params
        .validate()
        .map_err(|err| AppError::BadRequestErr(err.to_string()))?;
    if params.mobile.is_none() && params.national_id.is_none() {
        let msg = "mobile or nationalId is required".to_owned();
        return Err(AppError::BadRequestErr(msg));
    }
    let report = state
        .uniqueness
        .check(params.mobile.as_deref(), params.national_id.as_deref())
        .await?;
    let res = UniquenessResponse {
        mobile_taken: report.mobile_taken,
        national_id_taken: report.national_id_taken,
        conflicting_worker_id: report.conflicting_worker_id,
    };
    Ok(Json(res))
}
