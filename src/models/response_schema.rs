use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::WorkerRecord;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenericResponse {
    pub success: bool,
    pub message: String,
}

/// response schema for send otp
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpResponse {
    pub success: bool,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// response schema for verify otp
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// response schema for the uniqueness query
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UniquenessResponse {
    pub mobile_taken: bool,
    pub national_id_taken: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_worker_id: Option<String>,
}

/// response schema for registration and login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkerResponse {
    pub success: bool,
    pub data: WorkerRecord,
}
