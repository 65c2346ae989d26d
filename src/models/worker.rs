use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::registrant::{Gender, Registrant, WorkingCategory};

/// Registered and verified worker, as persisted in the workers collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRecord {
    pub worker_id: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub working_category: WorkingCategory,
    pub migration_place: String,
    pub mobile: String,
    pub national_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub is_verified: bool,
    pub registered_at: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<u64>,
}

impl WorkerRecord {
    pub fn new(registrant: &Registrant, worker_id: &str, ts: u64) -> Self {
        Self {
            worker_id: worker_id.to_owned(),
            name: registrant.name().to_owned(),
            age: registrant.age(),
            gender: registrant.gender(),
            working_category: registrant.working_category(),
            migration_place: registrant.migration_place().to_owned(),
            mobile: registrant.mobile().to_owned(),
            national_id: registrant.national_id().to_owned(),
            email: registrant.email().map(str::to_owned),
            is_verified: true,
            registered_at: ts,
            last_login_at: None,
        }
    }
}
