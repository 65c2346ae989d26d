use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use super::AuthBackend;
use crate::{
    constants::*,
    models::{Registrant, WorkerRecord},
    utils::{generate_worker_id, AuthError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// a worker session was established, carries the worker id
    Established(String),
    Cleared,
}

/// Holder of the currently authenticated worker.
/// Every change is broadcast to the subscribers.
#[derive(Debug)]
pub struct SessionContext {
    current: RwLock<Option<WorkerRecord>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for SessionContext {
    fn default() -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Self {
            current: RwLock::new(None),
            events,
        }
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn current(&self) -> Option<WorkerRecord> {
        self.current.read().await.clone()
    }

    pub async fn is_established(&self) -> bool {
        self.current.read().await.is_some()
    }

    async fn set(&self, worker: WorkerRecord) {
        let worker_id = worker.worker_id.clone();
        *self.current.write().await = Some(worker);
        self.publish(SessionEvent::Established(worker_id));
    }

    async fn clear(&self) {
        let previous = self.current.write().await.take();
        if previous.is_some() {
            self.publish(SessionEvent::Cleared);
        }
    }

    fn publish(&self, event: SessionEvent) {
        // no subscribers is not an error
        if self.events.send(event).is_err() {
            tracing::trace!("session event without subscribers");
        }
    }
}

/// Turns a successful otp verification into a session
pub struct SessionEstablisher {
    backend: Arc<dyn AuthBackend>,
    session: Arc<SessionContext>,
}

impl SessionEstablisher {
    pub fn new(backend: Arc<dyn AuthBackend>, session: Arc<SessionContext>) -> Self {
        Self { backend, session }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Commit a verified registrant under a freshly generated worker id.
    /// The session is not touched.
    pub async fn commit(&self, registrant: &Registrant) -> Result<WorkerRecord, AuthError> {
        let worker_id = generate_worker_id();
        tracing::debug!("committing registrant as {worker_id}");
        self.backend
            .commit_registration(registrant, &worker_id)
            .await
    }

    /// Load the existing worker of a verified mobile and record the login.
    /// Never creates a worker.
    pub async fn load(&self, mobile: &str) -> Result<WorkerRecord, AuthError> {
        self.backend.record_login(mobile).await
    }

    /// Make the worker the current session
    pub async fn establish(&self, worker: WorkerRecord) {
        tracing::info!("session established for {}", worker.worker_id);
        self.session.set(worker).await;
    }

    pub async fn register(&self, registrant: &Registrant) -> Result<WorkerRecord, AuthError> {
        let worker = self.commit(registrant).await?;
        self.establish(worker.clone()).await;
        Ok(worker)
    }

    pub async fn login(&self, mobile: &str) -> Result<WorkerRecord, AuthError> {
        let worker = self.load(mobile).await?;
        self.establish(worker.clone()).await;
        Ok(worker)
    }

    pub async fn logout(&self) {
        self.session.clear().await;
    }
}
