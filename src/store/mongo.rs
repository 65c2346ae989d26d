use axum::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId},
    error::{Error as MongoError, ErrorKind, WriteFailure, RETRYABLE_WRITE_ERROR},
    options::{FindOneAndUpdateOptions, FindOneOptions, ReturnDocument},
};
use std::sync::Arc;

use super::{OtpStore, StoreError, WorkerStore};
use crate::{
    constants::*,
    database::AppDatabase,
    models::{OtpChallenge, WorkerRecord},
    utils::ConflictField,
};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Store backed by mongodb collections
pub struct MongoStore {
    db: Arc<AppDatabase>,
}

impl MongoStore {
    pub fn new(db: Arc<AppDatabase>) -> Self {
        Self { db }
    }

    /// Create the indexes the store relies on.
    /// The unique indexes are the authority on duplicate registrations.
    pub async fn ensure_indexes(&self) -> anyhow::Result<()> {
        self.db
            .create_index(
                DB_NAME,
                COLL_WORKERS,
                doc! {"mobile": 1},
                INDEX_WORKER_MOBILE,
                true,
            )
            .await?;
        self.db
            .create_index(
                DB_NAME,
                COLL_WORKERS,
                doc! {"nationalId": 1},
                INDEX_WORKER_NATIONAL_ID,
                true,
            )
            .await?;
        self.db
            .create_index(
                DB_NAME,
                COLL_OTP_CHALLENGES,
                doc! {"phone": 1, "code": 1, "createdAt": -1},
                INDEX_OTP_LOOKUP,
                false,
            )
            .await?;
        tracing::debug!("mongodb indexes are in place");
        Ok(())
    }
}

/// Sort mongodb errors into network failures, unique index violations and the rest
fn classify(err: MongoError) -> StoreError {
    if err.contains_label(RETRYABLE_WRITE_ERROR) {
        return StoreError::Network(err.to_string());
    }
    match err.kind.as_ref() {
        ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } => {
            StoreError::Network(err.to_string())
        }
        ErrorKind::ConnectionPoolCleared { .. } => StoreError::Network(err.to_string()),
        ErrorKind::Write(WriteFailure::WriteError(write_err))
            if write_err.code == DUPLICATE_KEY_CODE =>
        {
            let field = if write_err.message.contains(INDEX_WORKER_NATIONAL_ID) {
                ConflictField::NationalId
            } else {
                ConflictField::Mobile
            };
            StoreError::Duplicate(field)
        }
        _ => StoreError::Other(err.into()),
    }
}

#[async_trait]
impl OtpStore for MongoStore {
    async fn insert_challenge(&self, challenge: &OtpChallenge) -> Result<(), StoreError> {
        self.db
            .insert_one::<OtpChallenge>(DB_NAME, COLL_OTP_CHALLENGES, challenge, None)
            .await
            .map_err(classify)
    }

    async fn find_latest_unconsumed(
        &self,
        phone: &str,
        code: &str,
    ) -> Result<Option<OtpChallenge>, StoreError> {
        let filter = doc! {"phone": phone, "code": code, "consumed": false};
        let options = FindOneOptions::builder()
            .sort(doc! {"createdAt": -1, "_id": -1})
            .build();
        self.db
            .find_one::<OtpChallenge>(DB_NAME, COLL_OTP_CHALLENGES, Some(filter), Some(options))
            .await
            .map_err(classify)
    }

    async fn mark_consumed(&self, id: &ObjectId, ts: u64) -> Result<bool, StoreError> {
        // the consumed=false condition makes the flip atomic
        let filter = doc! {"_id": *id, "consumed": false};
        let update = doc! {"$set": {"consumed": true, "consumedAt": ts as i64}};
        let result = self
            .db
            .update_one(DB_NAME, COLL_OTP_CHALLENGES, filter, update, None)
            .await
            .map_err(classify)?;
        Ok(result.modified_count == 1)
    }

    async fn find_challenge(&self, id: &ObjectId) -> Result<Option<OtpChallenge>, StoreError> {
        self.db
            .find_one::<OtpChallenge>(
                DB_NAME,
                COLL_OTP_CHALLENGES,
                Some(doc! {"_id": *id}),
                None,
            )
            .await
            .map_err(classify)
    }

    async fn claim_verification(
        &self,
        phone: &str,
        since: u64,
        ts: u64,
    ) -> Result<bool, StoreError> {
        // a verification is spent once usedAt is set
        let filter = doc! {
            "phone": phone,
            "consumed": true,
            "consumedAt": {"$gte": since as i64},
            "usedAt": {"$exists": false},
        };
        let update = doc! {"$set": {"usedAt": ts as i64}};
        let result = self
            .db
            .update_one(DB_NAME, COLL_OTP_CHALLENGES, filter, update, None)
            .await
            .map_err(classify)?;
        Ok(result.modified_count == 1)
    }
}

#[async_trait]
impl WorkerStore for MongoStore {
    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<WorkerRecord>, StoreError> {
        let filter = Some(doc! {"mobile": mobile});
        self.db
            .find_one::<WorkerRecord>(DB_NAME, COLL_WORKERS, filter, None)
            .await
            .map_err(classify)
    }

    async fn find_by_national_id(
        &self,
        national_id: &str,
    ) -> Result<Option<WorkerRecord>, StoreError> {
        let filter = Some(doc! {"nationalId": national_id});
        self.db
            .find_one::<WorkerRecord>(DB_NAME, COLL_WORKERS, filter, None)
            .await
            .map_err(classify)
    }

    async fn insert_worker(&self, worker: &WorkerRecord) -> Result<(), StoreError> {
        self.db
            .insert_one::<WorkerRecord>(DB_NAME, COLL_WORKERS, worker, None)
            .await
            .map_err(classify)
    }

    async fn record_login(
        &self,
        mobile: &str,
        ts: u64,
    ) -> Result<Option<WorkerRecord>, StoreError> {
        let filter = doc! {"mobile": mobile};
        let update = doc! {"$set": {"lastLoginAt": ts as i64}};
        let mut options = FindOneAndUpdateOptions::default();
        options.upsert = Some(false);
        options.return_document = Some(ReturnDocument::After);
        self.db
            .find_one_and_update::<WorkerRecord>(
                DB_NAME,
                COLL_WORKERS,
                filter,
                update,
                Some(options),
            )
            .await
            .map_err(classify)
    }
}
