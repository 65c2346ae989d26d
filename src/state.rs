use std::sync::Arc;

use crate::{
    config::{AppConfig, StoreBackend},
    database::AppDatabase,
    services::{OtpIssuer, OtpVerifier, RegistrantCache, RegistrationService, UniquenessChecker},
    sms::{build_sms_sender, SmsSender},
    store::{MemoryStore, MongoStore, OtpStore, WorkerStore},
    utils::RetryPolicy,
};

/// Shared state of the http handlers
pub struct AppState {
    pub config: AppConfig,
    pub uniqueness: UniquenessChecker,
    pub issuer: OtpIssuer,
    pub verifier: OtpVerifier,
    pub registration: RegistrationService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        otps: Arc<dyn OtpStore>,
        workers: Arc<dyn WorkerStore>,
        sms: Arc<dyn SmsSender>,
        retry: RetryPolicy,
    ) -> Self {
        let cache = Arc::new(RegistrantCache::new());
        let uniqueness = UniquenessChecker::new(workers.clone(), cache.clone(), retry);
        let issuer = OtpIssuer::new(otps.clone(), sms, config.otp.clone(), retry);
        let verifier = OtpVerifier::new(otps.clone(), retry);
        let registration = RegistrationService::new(workers, otps, cache, retry);
        Self {
            config,
            uniqueness,
            issuer,
            verifier,
            registration,
        }
    }

    /// Build the state with the store and sms gateway picked by the config
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let sms = build_sms_sender(&config.sms)?;
        let state = match config.store {
            StoreBackend::Mongo => {
                let db = Arc::new(AppDatabase::new().await?);
                let store = Arc::new(MongoStore::new(db));
                store.ensure_indexes().await?;
                Self::new(config, store.clone(), store, sms, RetryPolicy::default())
            }
            StoreBackend::Memory => {
                tracing::warn!("using the in memory store, data is lost on restart");
                let store = Arc::new(MemoryStore::new());
                Self::new(config, store.clone(), store, sms, RetryPolicy::default())
            }
        };
        Ok(state)
    }
}
