use axum::async_trait;
use mongodb::bson::oid::ObjectId;
use std::fmt::{Display, Formatter, Result as FmtResult};

#[cfg(test)]
use mockall::automock;

use crate::{
    models::{OtpChallenge, WorkerRecord},
    utils::{AuthError, ConflictField, Transient},
};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug)]
pub enum StoreError {
    /// connectivity problem, the call may succeed when retried
    Network(String),
    /// a unique index rejected the write
    Duplicate(ConflictField),
    Other(anyhow::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Network(msg) => write!(f, "store unreachable: {msg}"),
            Self::Duplicate(field) => write!(f, "duplicate {field}"),
            Self::Other(err) => write!(f, "store error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl Transient for StoreError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Network(msg) => {
                tracing::warn!("giving up on store call: {msg}");
                Self::TransientNetwork
            }
            StoreError::Duplicate(field) => Self::Conflict(field),
            StoreError::Other(err) => Self::Unexpected(err),
        }
    }
}

/// Persistence of otp challenges
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OtpStore: Send + Sync {
    async fn insert_challenge(&self, challenge: &OtpChallenge) -> Result<(), StoreError>;

    /// Most recently created challenge for the phone and code which is not consumed yet.
    /// Expired challenges are returned as well.
    async fn find_latest_unconsumed(
        &self,
        phone: &str,
        code: &str,
    ) -> Result<Option<OtpChallenge>, StoreError>;

    /// Atomically flip the consumed flag. Returns false when the challenge
    /// was already consumed by someone else.
    async fn mark_consumed(&self, id: &ObjectId, ts: u64) -> Result<bool, StoreError>;

    async fn find_challenge(&self, id: &ObjectId) -> Result<Option<OtpChallenge>, StoreError>;

    /// Atomically stamp one challenge of the phone which was consumed at or after
    /// `since` and not used yet. Returns false when no such verification is left.
    async fn claim_verification(
        &self,
        phone: &str,
        since: u64,
        ts: u64,
    ) -> Result<bool, StoreError>;
}

/// Persistence of worker records. Mobile and national id are unique.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WorkerStore: Send + Sync {
    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<WorkerRecord>, StoreError>;

    async fn find_by_national_id(
        &self,
        national_id: &str,
    ) -> Result<Option<WorkerRecord>, StoreError>;

    /// Insert a new worker, fails with `StoreError::Duplicate` on a unique field collision
    async fn insert_worker(&self, worker: &WorkerRecord) -> Result<(), StoreError>;

    /// Stamp the last login time, returns the updated worker if it exists
    async fn record_login(&self, mobile: &str, ts: u64)
        -> Result<Option<WorkerRecord>, StoreError>;
}
