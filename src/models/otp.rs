use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{constants::*, utils::mins_to_ms};

/// One time password issued for a phone number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtpChallenge {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub phone: String,
    pub code: String,
    pub created_at: u64,
    pub expires_at: u64,
    pub consumed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_at: Option<u64>,

    /// set when a registration or login spent this verification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<u64>,
}

impl OtpChallenge {
    pub fn new(phone: &str, code: &str, ts: u64) -> Self {
        Self {
            id: ObjectId::new(),
            phone: phone.to_owned(),
            code: code.to_owned(),
            created_at: ts,
            expires_at: ts + mins_to_ms(OTP_VALIDITY_MINS),
            consumed: false,
            consumed_at: None,
            used_at: None,
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }
}
