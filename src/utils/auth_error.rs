use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

use crate::models::ValidationIssue;

/// Unique field of a worker which collided with an existing registration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ConflictField {
    Mobile,
    NationalId,
}

impl Display for ConflictField {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Mobile => write!(f, "mobile"),
            Self::NationalId => write!(f, "nationalId"),
        }
    }
}

/// Errors of the registration and otp workflow.
/// Every remote failure is converted into one of these before it reaches a caller.
#[derive(Debug)]
pub enum AuthError {
    Validation(Vec<ValidationIssue>),
    Conflict(ConflictField),
    Delivery(String),
    Expired,
    InvalidCode,
    TransientNetwork,
    NotVerified,
    NotFound,
    Unexpected(anyhow::Error),
}

impl AuthError {
    /// Message which is safe to show to the end user
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(issues) => issues
                .iter()
                .map(|issue| issue.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            Self::Conflict(ConflictField::Mobile) => {
                "This mobile number is already registered".into()
            }
            Self::Conflict(ConflictField::NationalId) => {
                "This Aadhaar number is already registered".into()
            }
            Self::Delivery(_) => "Could not deliver the OTP, please request a new one".into(),
            Self::Expired => "OTP has expired, please request a new one".into(),
            Self::InvalidCode => "Invalid OTP code".into(),
            Self::TransientNetwork => {
                "Service is temporarily unavailable, please try again".into()
            }
            Self::NotVerified => "Mobile number is not verified".into(),
            Self::NotFound => {
                "No account found with this mobile number. Please register first.".into()
            }
            Self::Unexpected(_) => "Something went wrong, please try again".into(),
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Delivery(reason) => write!(f, "otp delivery failed: {reason}"),
            Self::Unexpected(err) => write!(f, "unexpected error: {err}"),
            _ => write!(f, "{}", self.user_message()),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unexpected(err)
    }
}
