use axum::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::Mutex;

use super::{OtpStore, StoreError, WorkerStore};
use crate::{
    models::{OtpChallenge, WorkerRecord},
    utils::ConflictField,
};

/// In process store with the same unique constraints as the mongodb indexes.
/// Used for local runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    otps: Mutex<Vec<OtpChallenge>>,
    workers: Mutex<Vec<WorkerRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every challenge issued for a phone, oldest first
    pub async fn challenges_for(&self, phone: &str) -> Vec<OtpChallenge> {
        let otps = self.otps.lock().await;
        otps.iter().filter(|c| c.phone == phone).cloned().collect()
    }

    pub async fn worker_count(&self) -> usize {
        self.workers.lock().await.len()
    }
}

#[async_trait]
impl OtpStore for MemoryStore {
    async fn insert_challenge(&self, challenge: &OtpChallenge) -> Result<(), StoreError> {
        self.otps.lock().await.push(challenge.clone());
        Ok(())
    }

    async fn find_latest_unconsumed(
        &self,
        phone: &str,
        code: &str,
    ) -> Result<Option<OtpChallenge>, StoreError> {
        let otps = self.otps.lock().await;
        // ties on created_at go to the later insert
        let latest = otps
            .iter()
            .enumerate()
            .filter(|(_, c)| c.phone == phone && c.code == code && !c.consumed)
            .max_by_key(|(idx, c)| (c.created_at, *idx))
            .map(|(_, c)| c.clone());
        Ok(latest)
    }

    async fn mark_consumed(&self, id: &ObjectId, ts: u64) -> Result<bool, StoreError> {
        let mut otps = self.otps.lock().await;
        let Some(otp) = otps.iter_mut().find(|c| &c.id == id && !c.consumed) else {
            return Ok(false);
        };
        otp.consumed = true;
        otp.consumed_at = Some(ts);
        Ok(true)
    }

    async fn find_challenge(&self, id: &ObjectId) -> Result<Option<OtpChallenge>, StoreError> {
        let otps = self.otps.lock().await;
        Ok(otps.iter().find(|c| &c.id == id).cloned())
    }

    async fn claim_verification(
        &self,
        phone: &str,
        since: u64,
        ts: u64,
    ) -> Result<bool, StoreError> {
        let mut otps = self.otps.lock().await;
        let unused = otps.iter_mut().find(|c| {
            c.phone == phone
                && c.consumed
                && c.used_at.is_none()
                && c.consumed_at.map_or(false, |at| at >= since)
        });
        let Some(otp) = unused else {
            return Ok(false);
        };
        otp.used_at = Some(ts);
        Ok(true)
    }
}

#[async_trait]
impl WorkerStore for MemoryStore {
    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<WorkerRecord>, StoreError> {
        let workers = self.workers.lock().await;
        Ok(workers.iter().find(|w| w.mobile == mobile).cloned())
    }

    async fn find_by_national_id(
        &self,
        national_id: &str,
    ) -> Result<Option<WorkerRecord>, StoreError> {
        let workers = self.workers.lock().await;
        Ok(workers.iter().find(|w| w.national_id == national_id).cloned())
    }

    async fn insert_worker(&self, worker: &WorkerRecord) -> Result<(), StoreError> {
        let mut workers = self.workers.lock().await;
        if workers.iter().any(|w| w.mobile == worker.mobile) {
            return Err(StoreError::Duplicate(ConflictField::Mobile));
        }
        if workers.iter().any(|w| w.national_id == worker.national_id) {
            return Err(StoreError::Duplicate(ConflictField::NationalId));
        }
        workers.push(worker.clone());
        Ok(())
    }

    async fn record_login(
        &self,
        mobile: &str,
        ts: u64,
    ) -> Result<Option<WorkerRecord>, StoreError> {
        let mut workers = self.workers.lock().await;
        let Some(worker) = workers.iter_mut().find(|w| w.mobile == mobile) else {
            return Ok(None);
        };
        worker.last_login_at = Some(ts);
        Ok(Some(worker.clone()))
    }
}
