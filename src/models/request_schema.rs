use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::registrant::{RegistrantDraft, MOBILE_REGEX, NATIONAL_ID_REGEX};
use crate::utils::{validate_otp_code, validate_phonenumber, validate_worker_id};

/// request body schema for sending an otp
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpReq {
    #[validate(custom(function = "validate_phonenumber"))]
    pub phone_number: String,
}

/// request body schema for verifying an otp
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpReq {
    #[validate(custom(function = "validate_phonenumber"))]
    pub phone_number: String,

    #[validate(length(min = 4, max = 6), custom(function = "validate_otp_code"))]
    pub code: String,
}

/// query schema for checking registered mobile / national id
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UniquenessQuery {
    #[validate(regex = "MOBILE_REGEX")]
    pub mobile: Option<String>,

    #[validate(regex = "NATIONAL_ID_REGEX")]
    pub national_id: Option<String>,
}

/// request body schema for committing a registration.
/// The registrant itself is checked by `RegistrantDraft::validate`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommitRegistrationReq {
    pub registrant: RegistrantDraft,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_worker_id"))]
    pub worker_id: Option<String>,
}

/// request body schema for recording a login after otp verification
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginReq {
    #[validate(regex = "MOBILE_REGEX")]
    pub mobile: String,
}
