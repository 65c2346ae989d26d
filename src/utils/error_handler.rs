use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::AuthError;
use crate::models::GenericResponse;

#[derive(Debug)]
pub enum AppError {
    BadRequestErr(String),
    NotFound(String),
    Forbidden(String),
    Conflict(String),
    Unavailable(String),
    AnyError(anyhow::Error),
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            Self::BadRequestErr(msg) => {
                tracing::debug!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::NotFound(msg) => {
                tracing::debug!("Not Found: {}", msg);
                (StatusCode::NOT_FOUND, msg)
            }
            Self::Forbidden(msg) => {
                tracing::debug!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, msg)
            }
            Self::Conflict(msg) => {
                tracing::debug!("Conflict: {}", msg);
                (StatusCode::CONFLICT, msg)
            }
            Self::Unavailable(msg) => {
                tracing::warn!("Unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            Self::AnyError(err) => {
                // the cause is logged, never returned to the caller
                tracing::error!("Something went wrong: {err:?}");
                let msg = "Something went wrong".to_owned();
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::AnyError(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let msg = err.user_message();
        match err {
            AuthError::Validation(_) => Self::BadRequestErr(msg),
            AuthError::Conflict(_) => Self::Conflict(msg),
            AuthError::Expired | AuthError::InvalidCode => Self::BadRequestErr(msg),
            AuthError::NotVerified => Self::Forbidden(msg),
            AuthError::NotFound => Self::NotFound(msg),
            AuthError::Delivery(reason) => {
                tracing::warn!("otp delivery failed: {reason}");
                Self::Unavailable(msg)
            }
            AuthError::TransientNetwork => Self::Unavailable(msg),
            AuthError::Unexpected(err) => Self::AnyError(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let response = GenericResponse {
            success: false,
            message,
        };
        (status, Json(response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ConflictField;

    #[test]
    fn test_auth_error_status_codes() {
        let cases = [
            (AuthError::Validation(vec![]), StatusCode::BAD_REQUEST),
            (
                AuthError::Conflict(ConflictField::Mobile),
                StatusCode::CONFLICT,
            ),
            (AuthError::InvalidCode, StatusCode::BAD_REQUEST),
            (AuthError::Expired, StatusCode::BAD_REQUEST),
            (AuthError::NotVerified, StatusCode::FORBIDDEN),
            (AuthError::NotFound, StatusCode::NOT_FOUND),
            (AuthError::TransientNetwork, StatusCode::SERVICE_UNAVAILABLE),
            (
                AuthError::Delivery("gateway down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AuthError::Unexpected(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            let res = AppError::from(err).into_response();
            assert_eq!(res.status(), status);
        }
    }

    #[tokio::test]
    async fn test_any_error_body_is_generic() {
        let err = AppError::from(anyhow::anyhow!("secret connection string"));
        let res = err.into_response();
        let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
        let response: GenericResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.success, false);
        assert_eq!(response.message, "Something went wrong");
    }
}
