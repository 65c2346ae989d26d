//! Client side of the registration and login workflow.
//!
//! The flows talk to an [`AuthBackend`], which is either the in process
//! [`AppState`] or the http api through [`HttpBackend`].

use axum::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    constants::OTP_UNDELIVERED_MSG,
    models::{Registrant, UniquenessQuery, WorkerRecord},
    services::UniquenessReport,
    state::AppState,
    utils::AuthError,
};

pub mod flow;
pub mod http;
pub mod session;

pub use flow::{FlowError, LoginFlow, LoginState, RegistrationFlow, RegistrationState};
pub use http::HttpBackend;
pub use session::{SessionContext, SessionEstablisher, SessionEvent};

/// Outcome of an otp request as seen by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpSent {
    pub delivered: bool,
    /// only present when the backend exposes generated codes
    pub code: Option<String>,
    pub error_message: Option<String>,
}

/// Remote operations the workflow depends on
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn check_uniqueness(&self, query: &UniquenessQuery)
        -> Result<UniquenessReport, AuthError>;

    async fn send_otp(&self, phone: &str) -> Result<OtpSent, AuthError>;

    /// `Err(InvalidCode)` or `Err(Expired)` when the code is not accepted
    async fn verify_otp(&self, phone: &str, code: &str) -> Result<(), AuthError>;

    async fn commit_registration(
        &self,
        registrant: &Registrant,
        worker_id: &str,
    ) -> Result<WorkerRecord, AuthError>;

    async fn record_login(&self, mobile: &str) -> Result<WorkerRecord, AuthError>;
}

#[async_trait]
impl AuthBackend for AppState {
    async fn check_uniqueness(
        &self,
        query: &UniquenessQuery,
    ) -> Result<UniquenessReport, AuthError> {
        self.uniqueness
            .check(query.mobile.as_deref(), query.national_id.as_deref())
            .await
    }

    async fn send_otp(&self, phone: &str) -> Result<OtpSent, AuthError> {
        let issued = self.issuer.issue(phone).await?;
        let delivered = issued.is_delivered();
        Ok(OtpSent {
            delivered,
            code: self.config.otp.expose_code.then_some(issued.code),
            error_message: (!delivered).then(|| OTP_UNDELIVERED_MSG.to_owned()),
        })
    }

    async fn verify_otp(&self, phone: &str, code: &str) -> Result<(), AuthError> {
        self.verifier.verify(phone, code).await
    }

    async fn commit_registration(
        &self,
        registrant: &Registrant,
        worker_id: &str,
    ) -> Result<WorkerRecord, AuthError> {
        self.registration.commit(registrant, worker_id).await
    }

    async fn record_login(&self, mobile: &str) -> Result<WorkerRecord, AuthError> {
        self.registration.record_login(mobile).await
    }
}
