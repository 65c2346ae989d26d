use std::sync::Arc;

use super::cache::RegistrantCache;
use crate::{
    constants::*,
    models::{Registrant, WorkerRecord},
    store::{OtpStore, StoreError, WorkerStore},
    utils::{get_epoch_ts, is_worker_id, mins_to_ms, normalize_phone, AuthError, RetryPolicy},
};

pub struct RegistrationService {
    workers: Arc<dyn WorkerStore>,
    otps: Arc<dyn OtpStore>,
    cache: Arc<RegistrantCache>,
    retry: RetryPolicy,
}

impl RegistrationService {
    pub fn new(
        workers: Arc<dyn WorkerStore>,
        otps: Arc<dyn OtpStore>,
        cache: Arc<RegistrantCache>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            workers,
            otps,
            cache,
            retry,
        }
    }

    /// Commit a verified registrant under the given worker id.
    /// The unique indexes of the worker store decide between concurrent commits.
    pub async fn commit(
        &self,
        registrant: &Registrant,
        worker_id: &str,
    ) -> Result<WorkerRecord, AuthError> {
        if !is_worker_id(worker_id) {
            return Err(anyhow::anyhow!("malformed worker id {worker_id}").into());
        }
        self.spend_verification(registrant.mobile()).await?;
        let worker = WorkerRecord::new(registrant, worker_id, get_epoch_ts());
        let inserted = self
            .retry
            .run("insert worker", || self.workers.insert_worker(&worker))
            .await;
        if let Err(StoreError::Duplicate(field)) = &inserted {
            tracing::debug!("registration of {worker_id} rejected, duplicate {field}");
        }
        inserted?;
        self.cache.remember(&worker).await;
        tracing::info!("worker {worker_id} registered");
        Ok(worker)
    }

    /// Stamp the login time of an existing worker
    pub async fn record_login(&self, mobile: &str) -> Result<WorkerRecord, AuthError> {
        self.spend_verification(mobile).await?;
        let ts = get_epoch_ts();
        let worker = self
            .retry
            .run("record worker login", || self.workers.record_login(mobile, ts))
            .await?
            .ok_or(AuthError::NotFound)?;
        tracing::info!("worker {} logged in", worker.worker_id);
        Ok(worker)
    }

    /// Use up one recent otp verification of the mobile.
    /// Every commit or login needs its own verification.
    async fn spend_verification(&self, mobile: &str) -> Result<(), AuthError> {
        let phone = normalize_phone(mobile);
        let now = get_epoch_ts();
        let since = now.saturating_sub(mins_to_ms(VERIFICATION_WINDOW_MINS));
        let claimed = self
            .retry
            .run("claim otp verification", || {
                self.otps.claim_verification(&phone, since, now)
            })
            .await?;
        if !claimed {
            tracing::debug!("no unused recent verification for {phone}");
            return Err(AuthError::NotVerified);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        models::{Gender, OtpChallenge, RegistrantDraft, WorkingCategory},
        store::{MemoryStore, MockOtpStore, MockWorkerStore},
        utils::ConflictField,
    };

    fn registrant(mobile: &str, national_id: &str) -> Registrant {
        let mut draft = RegistrantDraft::default();
        draft
            .set_name("Ravi Kumar")
            .set_age(28)
            .set_gender(Gender::Male)
            .set_working_category(WorkingCategory::Construction)
            .set_migration_place("Mumbai")
            .set_mobile(mobile)
            .set_national_id(national_id);
        draft.validate().unwrap()
    }

    fn service(store: Arc<MemoryStore>) -> RegistrationService {
        RegistrationService::new(
            store.clone(),
            store,
            Arc::new(RegistrantCache::new()),
            RetryPolicy::new(3, Duration::from_millis(1)),
        )
    }

    async fn verified_store(phones: &[&str]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let now = get_epoch_ts();
        for phone in phones {
            let otp = OtpChallenge::new(phone, "123456", now);
            store.insert_challenge(&otp).await.unwrap();
            store.mark_consumed(&otp.id, now).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_commit_after_verification() {
        let store = verified_store(&["+919876543210"]).await;
        let service = service(store.clone());
        let worker = service
            .commit(&registrant("9876543210", "111122223333"), "MWAP-AB12C-2025")
            .await
            .unwrap();
        assert_eq!(worker.worker_id, "MWAP-AB12C-2025");
        assert!(worker.is_verified);
        assert_eq!(store.worker_count().await, 1);
        assert_eq!(
            service.cache.by_mobile("9876543210").await.as_deref(),
            Some("MWAP-AB12C-2025")
        );
    }

    #[tokio::test]
    async fn test_commit_without_verification() {
        let store = Arc::new(MemoryStore::new());
        let result = service(store.clone())
            .commit(&registrant("9876543210", "111122223333"), "MWAP-AB12C-2025")
            .await;
        assert!(matches!(result, Err(AuthError::NotVerified)));
        assert_eq!(store.worker_count().await, 0);
    }

    #[tokio::test]
    async fn test_stale_verification_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let long_ago = get_epoch_ts() - mins_to_ms(VERIFICATION_WINDOW_MINS + 1);
        let otp = OtpChallenge::new("+919876543210", "123456", long_ago);
        store.insert_challenge(&otp).await.unwrap();
        store.mark_consumed(&otp.id, long_ago).await.unwrap();
        let result = service(store)
            .commit(&registrant("9876543210", "111122223333"), "MWAP-AB12C-2025")
            .await;
        assert!(matches!(result, Err(AuthError::NotVerified)));
    }

    #[tokio::test]
    async fn test_malformed_worker_id() {
        let store = verified_store(&["+919876543210"]).await;
        let result = service(store)
            .commit(&registrant("9876543210", "111122223333"), "WORKER-1")
            .await;
        assert!(matches!(result, Err(AuthError::Unexpected(_))));
    }

    #[tokio::test]
    async fn test_concurrent_commits_one_wins() {
        // two verifications, so both commits get as far as the insert
        let store = verified_store(&["+919876543210", "+919876543210"]).await;
        let service = Arc::new(service(store.clone()));
        let (a, b) = (service.clone(), service.clone());
        let (r1, r2) = tokio::join!(
            async move {
                a.commit(&registrant("9876543210", "111122223333"), "MWAP-AAAAA-2025")
                    .await
            },
            async move {
                b.commit(&registrant("9876543210", "444455556666"), "MWAP-BBBBB-2025")
                    .await
            }
        );
        let (ok, err) = match (r1, r2) {
            (Ok(w), Err(e)) | (Err(e), Ok(w)) => (w, e),
            other => panic!("expected exactly one winner, got {other:?}"),
        };
        assert!(ok.worker_id.starts_with("MWAP-"));
        assert!(matches!(err, AuthError::Conflict(ConflictField::Mobile)));
        assert_eq!(store.worker_count().await, 1);
    }

    #[tokio::test]
    async fn test_national_id_conflict() {
        let store = verified_store(&["+919876543210", "+918765432109"]).await;
        let service = service(store);
        service
            .commit(&registrant("9876543210", "111122223333"), "MWAP-AAAAA-2025")
            .await
            .unwrap();
        let result = service
            .commit(&registrant("8765432109", "111122223333"), "MWAP-BBBBB-2025")
            .await;
        assert!(matches!(
            result,
            Err(AuthError::Conflict(ConflictField::NationalId))
        ));
    }

    #[tokio::test]
    async fn test_record_login() {
        let store = verified_store(&["+919876543210"; 3]).await;
        let service = service(store);
        let result = service.record_login("9876543210").await;
        assert!(matches!(result, Err(AuthError::NotFound)));
        service
            .commit(&registrant("9876543210", "111122223333"), "MWAP-AAAAA-2025")
            .await
            .unwrap();
        let worker = service.record_login("9876543210").await.unwrap();
        assert_eq!(worker.worker_id, "MWAP-AAAAA-2025");
        assert!(worker.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_insert_network_errors_give_up() {
        let mut otps = MockOtpStore::new();
        otps.expect_claim_verification()
            .returning(|_, _, _| Ok(true));
        let mut workers = MockWorkerStore::new();
        workers
            .expect_insert_worker()
            .times(3)
            .returning(|_| Err(StoreError::Network("timed out".into())));
        let service = RegistrationService::new(
            Arc::new(workers),
            Arc::new(otps),
            Arc::new(RegistrantCache::new()),
            RetryPolicy::new(3, Duration::from_millis(1)),
        );
        let result = service
            .commit(&registrant("9876543210", "111122223333"), "MWAP-AAAAA-2025")
            .await;
        assert!(matches!(result, Err(AuthError::TransientNetwork)));
    }

    #[tokio::test]
    async fn test_verification_is_spent_once() {
        let store = verified_store(&["+919876543210"; 2]).await;
        let service = service(store.clone());
        service
            .commit(&registrant("9876543210", "111122223333"), "MWAP-AAAAA-2025")
            .await
            .unwrap();
        service.record_login("9876543210").await.unwrap();
        // the same mobile can not log in again without a fresh otp
        let result = service.record_login("9876543210").await;
        assert!(matches!(result, Err(AuthError::NotVerified)));
        let used = store.challenges_for("+919876543210").await;
        assert!(used.iter().all(|c| c.used_at.is_some()));
    }
}
