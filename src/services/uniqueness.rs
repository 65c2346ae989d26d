use std::sync::Arc;

use super::cache::RegistrantCache;
use crate::{
    store::WorkerStore,
    utils::{AuthError, ConflictField, RetryPolicy},
};

/// Result of a uniqueness check, one flag per queried field
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UniquenessReport {
    pub mobile_taken: bool,
    pub national_id_taken: bool,
    pub conflicting_worker_id: Option<String>,
}

impl UniquenessReport {
    /// First conflicting field, mobile is reported before national id
    pub fn conflict(&self) -> Option<ConflictField> {
        if self.mobile_taken {
            Some(ConflictField::Mobile)
        } else if self.national_id_taken {
            Some(ConflictField::NationalId)
        } else {
            None
        }
    }

    pub fn is_clear(&self) -> bool {
        self.conflict().is_none()
    }
}

pub struct UniquenessChecker {
    store: Arc<dyn WorkerStore>,
    cache: Arc<RegistrantCache>,
    retry: RetryPolicy,
}

impl UniquenessChecker {
    pub fn new(store: Arc<dyn WorkerStore>, cache: Arc<RegistrantCache>, retry: RetryPolicy) -> Self {
        Self {
            store,
            cache,
            retry,
        }
    }

    /// Check the given mobile and national id against committed registrations.
    /// The local cache is consulted first, the worker store only on a cache miss.
    pub async fn check(
        &self,
        mobile: Option<&str>,
        national_id: Option<&str>,
    ) -> Result<UniquenessReport, AuthError> {
        let mut report = UniquenessReport::default();
        if let Some(mobile) = mobile {
            if let Some(worker_id) = self.lookup_mobile(mobile).await? {
                report.mobile_taken = true;
                report.conflicting_worker_id = Some(worker_id);
            }
        }
        if let Some(national_id) = national_id {
            if let Some(worker_id) = self.lookup_national_id(national_id).await? {
                report.national_id_taken = true;
                report.conflicting_worker_id.get_or_insert(worker_id);
            }
        }
        tracing::debug!("uniqueness check result: {:?}", report);
        Ok(report)
    }

    async fn lookup_mobile(&self, mobile: &str) -> Result<Option<String>, AuthError> {
        if let Some(worker_id) = self.cache.by_mobile(mobile).await {
            tracing::debug!("mobile found in local cache");
            return Ok(Some(worker_id));
        }
        // no rows is a clear result, only store failures are errors
        let worker = self
            .retry
            .run("find worker by mobile", || self.store.find_by_mobile(mobile))
            .await?;
        let Some(worker) = worker else {
            return Ok(None);
        };
        self.cache.remember(&worker).await;
        Ok(Some(worker.worker_id))
    }

    async fn lookup_national_id(&self, national_id: &str) -> Result<Option<String>, AuthError> {
        if let Some(worker_id) = self.cache.by_national_id(national_id).await {
            tracing::debug!("national id found in local cache");
            return Ok(Some(worker_id));
        }
        let worker = self
            .retry
            .run("find worker by national id", || {
                self.store.find_by_national_id(national_id)
            })
            .await?;
        let Some(worker) = worker else {
            return Ok(None);
        };
        self.cache.remember(&worker).await;
        Ok(Some(worker.worker_id))
    }
}
