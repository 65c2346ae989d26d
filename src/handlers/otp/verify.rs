use axum::{extract::State, Json};
use std::sync::Arc;

use super::compact_phone;
use crate::{
    models::{GenericResponse, VerifyOtpReq, VerifyOtpResponse},
    state::AppState,
    utils::{AppError, AuthError, ValidatedBody},
};

/// Verify otp endpoint
///
/// Check the code against the latest matching otp of the phone and consume it.
/// A wrong or expired code is not an http error, it answers `valid: false`
#[utoipa::path(
    post,
    path = "/api/v1/otp/verify",
    request_body = VerifyOtpReq,
    responses(
        (status = 200, description = "Verification outcome", body = VerifyOtpResponse),
        (status = 400, description = "Malformed request", body = GenericResponse),
        (status = 503, description = "Otp store unavailable", body = GenericResponse),
    ),
    tag = "Otp API"
)]
pub async fn verify_otp_handler(
    State(state): State<Arc<AppState>>,
    ValidatedBody(body): ValidatedBody<VerifyOtpReq>,
) -> Result<Json<VerifyOtpResponse>, AppError> {
    let phone = compact_phone(&body.phone_number);
    let res = match state.verifier.verify(&phone, &body.code).await {
        Ok(()) => VerifyOtpResponse {
            valid: true,
            error_message: None,
        },
        Err(err @ (AuthError::InvalidCode | AuthError::Expired)) => VerifyOtpResponse {
            valid: false,
            error_message: Some(err.user_message()),
        },
        Err(err) => return Err(err.into()),
    };
    Ok(Json(res))
}
