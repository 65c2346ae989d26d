use axum::{async_trait, extract::FromRequest, http::Request, Json, RequestExt};
use lazy_static::lazy_static;
use regex::Regex;
use validator::{Validate, ValidationError};

use super::{is_worker_id, normalize_phone, AppError};

lazy_static! {
    static ref E164_REGEX: Regex = Regex::new(r"^\+[1-9]\d{7,14}$").unwrap();
}

/// Custom validator function to check phone number
/// The phone must become a valid E.164 number once normalized
pub fn validate_phonenumber(phone: &str) -> Result<(), ValidationError> {
    let allowed = |ch: char| ch.is_ascii_digit() || matches!(ch, '+' | ' ' | '-');
    if phone.is_empty() || !phone.chars().all(allowed) {
        let mut err = ValidationError::new("phone");
        err.message = Some(format!("Phone has invalid characters: {phone}").into());
        return Err(err);
    }
    let normalized = normalize_phone(phone).replace([' ', '-'], "");
    if !E164_REGEX.is_match(&normalized) {
        let mut err = ValidationError::new("phone");
        err.message = Some(format!("Phone is not a valid number: {phone}").into());
        return Err(err);
    }

    Ok(())
}

/// Custom validator function to check an otp code is all digits
pub fn validate_otp_code(code: &str) -> Result<(), ValidationError> {
    if !code.chars().all(|ch| ch.is_ascii_digit()) {
        let mut err = ValidationError::new("code");
        err.message = Some("OTP must be all digits".into());
        return Err(err);
    }
    Ok(())
}

/// Custom validator function to check a client supplied worker id
pub fn validate_worker_id(id: &str) -> Result<(), ValidationError> {
    if !is_worker_id(id) {
        let mut err = ValidationError::new("workerId");
        err.message = Some(format!("Invalid worker id: {id}").into());
        return Err(err);
    }
    Ok(())
}

pub struct ValidatedBody<T>(pub T);

#[async_trait]
impl<S, B, T> FromRequest<S, B> for ValidatedBody<T>
where
    B: Send + 'static,
    S: Send + Sync,
    T: Validate + 'static,
    Json<T>: FromRequest<(), B>,
{
    type Rejection = AppError;

    async fn from_request(req: Request<B>, _state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = req
            .extract::<Json<T>, _>()
            .await
            .map_err(|_| AppError::BadRequestErr("Invalid JSON body".into()))?;
        data.validate()
            .map_err(|err| AppError::BadRequestErr(err.to_string()))?;
        Ok(Self(data))
    }
}
