use axum::{extract::State, Json};
use std::sync::Arc;

use super::compact_phone;
use crate::{
    constants::OTP_UNDELIVERED_MSG,
    models::{GenericResponse, SendOtpReq, SendOtpResponse},
    services::DeliveryStatus,
    state::AppState,
    utils::{AppError, ValidatedBody},
};

/// Send otp endpoint
///
/// Generate a fresh otp for the phone number, store it and send it by sms.
/// A stored but undelivered otp still answers with success and `delivered: false`
#[utoipa::path(
    post,
    path = "/api/v1/otp/send",
    request_body = SendOtpReq,
    responses(
        (status = 200, description = "Otp generated", body = SendOtpResponse),
        (status = 400, description = "Invalid phone number", body = GenericResponse),
        (status = 503, description = "Otp could not be stored or delivered", body = GenericResponse),
    ),
    tag = "Otp API"
)]
pub async fn send_otp_handler(
    State(state): State<Arc<AppState>>,
    ValidatedBody(body): ValidatedBody<SendOtpReq>,
) -> Result<Json<SendOtpResponse>, AppError> {
    let phone = compact_phone(&body.phone_number);
    let issued = state.issuer.issue(&phone).await?;
    let error_message = match &issued.delivery {
        DeliveryStatus::Delivered(_) => None,
        DeliveryStatus::Undelivered(_) => Some(OTP_UNDELIVERED_MSG.to_owned()),
    };
    let code = state.config.otp.expose_code.then(|| issued.code.clone());
    let res = SendOtpResponse {
        success: true,
        delivered: issued.is_delivered(),
        code,
        error_message,
    };
    Ok(Json(res))
}
