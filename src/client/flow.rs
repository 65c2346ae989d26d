use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    sync::Arc,
};
use tokio::sync::{Mutex, MutexGuard};

use super::{AuthBackend, OtpSent, SessionEstablisher};
use crate::{
    models::{mobile_issue, Registrant, RegistrantDraft, UniquenessQuery, WorkerRecord},
    utils::{normalize_phone, AuthError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Collecting,
    CheckingUniqueness,
    AwaitingOtpDelivery,
    AwaitingOtpEntry,
    Verifying,
    SessionEstablished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    EnteringMobile,
    AwaitingOtpEntry,
    Verifying,
    SessionEstablished,
}

#[derive(Debug)]
pub enum FlowError {
    /// another operation of the flow is still pending
    Busy,
    /// the flow was abandoned while the operation was pending, its result is dropped
    Abandoned,
    /// the operation does not fit the current step of the flow
    WrongState,
    Auth(AuthError),
}

impl Display for FlowError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Busy => write!(f, "Please wait for the current request to finish"),
            Self::Abandoned => write!(f, "The flow was abandoned"),
            Self::WrongState => write!(f, "This step is not available right now"),
            Self::Auth(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for FlowError {}

impl From<AuthError> for FlowError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

struct FlowInner<S, D> {
    state: S,
    generation: u64,
    in_flight: bool,
    data: D,
}

/// State, generation counter and in flight flag shared by both flows.
/// The mutex is only held between network calls, never across them.
struct FlowCore<S, D> {
    initial: S,
    inner: Mutex<FlowInner<S, D>>,
}

impl<S, D> FlowCore<S, D>
where
    S: Copy + PartialEq,
    D: Default,
{
    fn new(initial: S) -> Self {
        let inner = FlowInner {
            state: initial,
            generation: 0,
            in_flight: false,
            data: D::default(),
        };
        Self {
            initial,
            inner: Mutex::new(inner),
        }
    }

    async fn state(&self) -> S {
        self.inner.lock().await.state
    }

    /// Start an operation from one of the allowed states.
    /// Returns the generation the result has to be applied to.
    async fn begin<R>(
        &self,
        allowed: &[S],
        pending: S,
        read: impl FnOnce(&D) -> R,
    ) -> Result<(u64, R), FlowError> {
        let mut inner = self.inner.lock().await;
        if inner.in_flight {
            return Err(FlowError::Busy);
        }
        if !allowed.contains(&inner.state) {
            return Err(FlowError::WrongState);
        }
        inner.in_flight = true;
        inner.state = pending;
        Ok((inner.generation, read(&inner.data)))
    }

    /// Lock the flow unless it was abandoned since the operation started
    async fn current(
        &self,
        generation: u64,
    ) -> Result<MutexGuard<'_, FlowInner<S, D>>, FlowError> {
        let inner = self.inner.lock().await;
        if inner.generation != generation {
            return Err(FlowError::Abandoned);
        }
        Ok(inner)
    }

    /// Move to the next step while the operation goes on
    async fn step(&self, generation: u64, state: S) -> Result<(), FlowError> {
        self.current(generation).await?.state = state;
        Ok(())
    }

    /// Complete the operation successfully
    async fn finish(&self, generation: u64, state: S, data: Option<D>) -> Result<(), FlowError> {
        let mut inner = self.current(generation).await?;
        inner.state = state;
        inner.in_flight = false;
        if let Some(data) = data {
            inner.data = data;
        }
        Ok(())
    }

    /// Complete the operation with an error and fall back to the given state
    async fn fail<R>(
        &self,
        generation: u64,
        state: S,
        err: impl Into<FlowError>,
    ) -> Result<R, FlowError> {
        let mut inner = self.current(generation).await?;
        inner.state = state;
        inner.in_flight = false;
        if state == self.initial {
            inner.data = D::default();
        }
        Err(err.into())
    }

    async fn abandon(&self) {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.in_flight = false;
        inner.state = self.initial;
        inner.data = D::default();
    }
}

#[derive(Default)]
struct RegistrationData {
    registrant: Option<Registrant>,
    phone: Option<String>,
}

/// Registration: details, uniqueness check, otp, verification, commit and session
pub struct RegistrationFlow {
    backend: Arc<dyn AuthBackend>,
    establisher: Arc<SessionEstablisher>,
    core: FlowCore<RegistrationState, RegistrationData>,
}

impl RegistrationFlow {
    pub fn new(backend: Arc<dyn AuthBackend>, establisher: Arc<SessionEstablisher>) -> Self {
        Self {
            backend,
            establisher,
            core: FlowCore::new(RegistrationState::Collecting),
        }
    }

    pub async fn state(&self) -> RegistrationState {
        self.core.state().await
    }

    /// Validate the details, check they are not registered yet and send an otp
    /// to the mobile number
    pub async fn submit_details(&self, draft: &RegistrantDraft) -> Result<OtpSent, FlowError> {
        use RegistrationState::*;
        let (generation, _) = self
            .core
            .begin(&[Collecting], CheckingUniqueness, |_| ())
            .await?;
        let registrant = match draft.validate() {
            Ok(registrant) => registrant,
            Err(issues) => {
                let err = AuthError::Validation(issues);
                return self.core.fail(generation, Collecting, err).await;
            }
        };
        let query = UniquenessQuery {
            mobile: Some(registrant.mobile().to_owned()),
            national_id: Some(registrant.national_id().to_owned()),
        };
        let report = match self.backend.check_uniqueness(&query).await {
            Ok(report) => report,
            Err(err) => return self.core.fail(generation, Collecting, err).await,
        };
        if let Some(field) = report.conflict() {
            let err = AuthError::Conflict(field);
            return self.core.fail(generation, Collecting, err).await;
        }

        self.core.step(generation, AwaitingOtpDelivery).await?;
        let phone = normalize_phone(registrant.mobile());
        let sent = match self.backend.send_otp(&phone).await {
            Ok(sent) => sent,
            Err(err) => return self.core.fail(generation, Collecting, err).await,
        };
        let data = RegistrationData {
            registrant: Some(registrant),
            phone: Some(phone),
        };
        self.core
            .finish(generation, AwaitingOtpEntry, Some(data))
            .await?;
        Ok(sent)
    }

    /// Issue a fresh otp, the earlier ones stay valid until they expire
    pub async fn resend_otp(&self) -> Result<OtpSent, FlowError> {
        use RegistrationState::*;
        let (generation, phone) = self
            .core
            .begin(&[AwaitingOtpEntry], AwaitingOtpDelivery, |data| {
                data.phone.clone()
            })
            .await?;
        let Some(phone) = phone else {
            return self
                .core
                .fail(generation, Collecting, FlowError::WrongState)
                .await;
        };
        match self.backend.send_otp(&phone).await {
            Ok(sent) => {
                self.core.finish(generation, AwaitingOtpEntry, None).await?;
                Ok(sent)
            }
            Err(err) => self.core.fail(generation, AwaitingOtpEntry, err).await,
        }
    }

    /// Verify the code, commit the registrant and establish the session
    pub async fn submit_code(&self, code: &str) -> Result<WorkerRecord, FlowError> {
        use RegistrationState::*;
        let (generation, (registrant, phone)) = self
            .core
            .begin(&[AwaitingOtpEntry], Verifying, |data| {
                (data.registrant.clone(), data.phone.clone())
            })
            .await?;
        let (Some(registrant), Some(phone)) = (registrant, phone) else {
            return self
                .core
                .fail(generation, Collecting, FlowError::WrongState)
                .await;
        };
        if let Err(err) = self.backend.verify_otp(&phone, code).await {
            return self.core.fail(generation, AwaitingOtpEntry, err).await;
        }
        // do not commit for an abandoned flow
        drop(self.core.current(generation).await?);

        let worker = match self.establisher.commit(&registrant).await {
            Ok(worker) => worker,
            Err(err @ AuthError::Conflict(_)) => {
                return self.core.fail(generation, Collecting, err).await
            }
            Err(err) => return self.core.fail(generation, AwaitingOtpEntry, err).await,
        };
        let mut inner = self.core.current(generation).await?;
        self.establisher.establish(worker.clone()).await;
        inner.state = SessionEstablished;
        inner.in_flight = false;
        inner.data = RegistrationData::default();
        Ok(worker)
    }

    /// Drop the flow back to the start. A pending operation finishes with
    /// `FlowError::Abandoned` and leaves the flow untouched.
    pub async fn abandon(&self) {
        tracing::debug!("registration flow abandoned");
        self.core.abandon().await;
    }
}

#[derive(Default)]
struct LoginData {
    mobile: Option<String>,
    phone: Option<String>,
}

/// Login of an existing worker by mobile otp
pub struct LoginFlow {
    backend: Arc<dyn AuthBackend>,
    establisher: Arc<SessionEstablisher>,
    core: FlowCore<LoginState, LoginData>,
}

impl LoginFlow {
    pub fn new(backend: Arc<dyn AuthBackend>, establisher: Arc<SessionEstablisher>) -> Self {
        Self {
            backend,
            establisher,
            core: FlowCore::new(LoginState::EnteringMobile),
        }
    }

    pub async fn state(&self) -> LoginState {
        self.core.state().await
    }

    /// Send an otp to the mobile number of an existing worker
    pub async fn submit_mobile(&self, mobile: &str) -> Result<OtpSent, FlowError> {
        use LoginState::*;
        let (generation, _) = self
            .core
            .begin(&[EnteringMobile], EnteringMobile, |_| ())
            .await?;
        let mobile = mobile.trim();
        if let Some(issue) = mobile_issue(mobile) {
            let err = AuthError::Validation(vec![issue]);
            return self.core.fail(generation, EnteringMobile, err).await;
        }
        let query = UniquenessQuery {
            mobile: Some(mobile.to_owned()),
            national_id: None,
        };
        match self.backend.check_uniqueness(&query).await {
            Ok(report) if report.mobile_taken => {}
            Ok(_) => {
                return self
                    .core
                    .fail(generation, EnteringMobile, AuthError::NotFound)
                    .await
            }
            Err(err) => return self.core.fail(generation, EnteringMobile, err).await,
        }
        let phone = normalize_phone(mobile);
        let sent = match self.backend.send_otp(&phone).await {
            Ok(sent) => sent,
            Err(err) => return self.core.fail(generation, EnteringMobile, err).await,
        };
        let data = LoginData {
            mobile: Some(mobile.to_owned()),
            phone: Some(phone),
        };
        self.core
            .finish(generation, AwaitingOtpEntry, Some(data))
            .await?;
        Ok(sent)
    }

    pub async fn resend_otp(&self) -> Result<OtpSent, FlowError> {
        use LoginState::*;
        let (generation, phone) = self
            .core
            .begin(&[AwaitingOtpEntry], AwaitingOtpEntry, |data| data.phone.clone())
            .await?;
        let Some(phone) = phone else {
            return self
                .core
                .fail(generation, EnteringMobile, FlowError::WrongState)
                .await;
        };
        match self.backend.send_otp(&phone).await {
            Ok(sent) => {
                self.core.finish(generation, AwaitingOtpEntry, None).await?;
                Ok(sent)
            }
            Err(err) => self.core.fail(generation, AwaitingOtpEntry, err).await,
        }
    }

    /// Verify the code, load the worker and establish the session
    pub async fn submit_code(&self, code: &str) -> Result<WorkerRecord, FlowError> {
        use LoginState::*;
        let (generation, (mobile, phone)) = self
            .core
            .begin(&[AwaitingOtpEntry], Verifying, |data| {
                (data.mobile.clone(), data.phone.clone())
            })
            .await?;
        let (Some(mobile), Some(phone)) = (mobile, phone) else {
            return self
                .core
                .fail(generation, EnteringMobile, FlowError::WrongState)
                .await;
        };
        if let Err(err) = self.backend.verify_otp(&phone, code).await {
            return self.core.fail(generation, AwaitingOtpEntry, err).await;
        }
        drop(self.core.current(generation).await?);

        let worker = match self.establisher.load(&mobile).await {
            Ok(worker) => worker,
            Err(err @ AuthError::NotFound) => {
                return self.core.fail(generation, EnteringMobile, err).await
            }
            Err(err) => return self.core.fail(generation, AwaitingOtpEntry, err).await,
        };
        let mut inner = self.core.current(generation).await?;
        self.establisher.establish(worker.clone()).await;
        inner.state = SessionEstablished;
        inner.in_flight = false;
        inner.data = LoginData::default();
        Ok(worker)
    }

    pub async fn abandon(&self) {
        tracing::debug!("login flow abandoned");
        self.core.abandon().await;
    }
}
