use axum::async_trait;
use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use super::{AuthBackend, OtpSent};
use crate::{
    constants::*,
    models::{
        CommitRegistrationReq, GenericResponse, LoginReq, Registrant, SendOtpReq,
        SendOtpResponse, UniquenessQuery, UniquenessResponse, ValidationIssue, VerifyOtpReq,
        VerifyOtpResponse, WorkerRecord, WorkerResponse,
    },
    services::UniquenessReport,
    utils::{AuthError, ConflictField},
};

/// Backend reached through the http api
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// `base_url` is the server root, e.g. `http://localhost:3000`
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, AuthError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        parse_response(res).await
    }
}

/// Connection problems are transient, anything else is unexpected
fn transport_error(err: reqwest::Error) -> AuthError {
    if err.is_connect() || err.is_timeout() {
        tracing::warn!("backend unreachable: {err}");
        return AuthError::TransientNetwork;
    }
    AuthError::Unexpected(err.into())
}

async fn parse_response<T: DeserializeOwned>(res: Response) -> Result<T, AuthError> {
    let status = res.status();
    if status.is_success() {
        return res.json::<T>().await.map_err(transport_error);
    }
    let message = match res.json::<GenericResponse>().await {
        Ok(body) => body.message,
        Err(_) => String::new(),
    };
    Err(error_from_status(status, &message))
}

/// Rebuild the domain error from the status code and the error message
fn error_from_status(status: StatusCode, message: &str) -> AuthError {
    match status {
        StatusCode::BAD_REQUEST => match ValidationIssue::parse_joined(message) {
            Some(issues) => AuthError::Validation(issues),
            // request schema rejections carry no registrant field
            None => {
                AuthError::Unexpected(anyhow::anyhow!("backend rejected request: {message}"))
            }
        },
        StatusCode::CONFLICT => {
            let national_id = AuthError::Conflict(ConflictField::NationalId);
            if message == national_id.user_message() {
                national_id
            } else {
                AuthError::Conflict(ConflictField::Mobile)
            }
        }
        StatusCode::FORBIDDEN => AuthError::NotVerified,
        StatusCode::NOT_FOUND => AuthError::NotFound,
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::REQUEST_TIMEOUT => {
            if message == AuthError::Delivery(String::new()).user_message() {
                AuthError::Delivery(message.to_owned())
            } else {
                AuthError::TransientNetwork
            }
        }
        _ => AuthError::Unexpected(anyhow::anyhow!("backend answered {status}: {message}")),
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn check_uniqueness(
        &self,
        query: &UniquenessQuery,
    ) -> Result<UniquenessReport, AuthError> {
        let res = self
            .client
            .get(self.url("/registration/check"))
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        let res: UniquenessResponse = parse_response(res).await?;
        Ok(UniquenessReport {
            mobile_taken: res.mobile_taken,
            national_id_taken: res.national_id_taken,
            conflicting_worker_id: res.conflicting_worker_id,
        })
    }

    async fn send_otp(&self, phone: &str) -> Result<OtpSent, AuthError> {
        let body = SendOtpReq {
            phone_number: phone.to_owned(),
        };
        let res: SendOtpResponse = self.post("/otp/send", &body).await?;
        Ok(OtpSent {
            delivered: res.delivered,
            code: res.code,
            error_message: res.error_message,
        })
    }

    async fn verify_otp(&self, phone: &str, code: &str) -> Result<(), AuthError> {
        let body = VerifyOtpReq {
            phone_number: phone.to_owned(),
            code: code.to_owned(),
        };
        let res: VerifyOtpResponse = self.post("/otp/verify", &body).await?;
        if res.valid {
            return Ok(());
        }
        let expired = AuthError::Expired;
        if res.error_message.as_deref() == Some(expired.user_message().as_str()) {
            return Err(expired);
        }
        Err(AuthError::InvalidCode)
    }

    async fn commit_registration(
        &self,
        registrant: &Registrant,
        worker_id: &str,
    ) -> Result<WorkerRecord, AuthError> {
        let body = CommitRegistrationReq {
            registrant: registrant.to_draft(),
            worker_id: Some(worker_id.to_owned()),
        };
        let res: WorkerResponse = self.post("/registration", &body).await?;
        Ok(res.data)
    }

    async fn record_login(&self, mobile: &str) -> Result<WorkerRecord, AuthError> {
        let body = LoginReq {
            mobile: mobile.to_owned(),
        };
        let res: WorkerResponse = self.post("/login", &body).await?;
        Ok(res.data)
    }
}
