use axum::async_trait;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    sync::Arc,
    time::Duration,
};

#[cfg(test)]
use mockall::automock;

use crate::{config::SmsConfig, constants::*, utils::Transient};

pub mod fast2sms;
pub mod log_sender;
pub mod twilio;

pub use fast2sms::Fast2SmsSender;
pub use log_sender::LogSmsSender;
pub use twilio::TwilioSmsSender;

/// Acknowledgement of a gateway which accepted the message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub provider: &'static str,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsError {
    /// gateway could not be reached or answered with a server error
    Network(String),
    /// gateway refused the message
    Rejected(String),
}

impl Display for SmsError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Network(msg) => write!(f, "sms gateway unreachable: {msg}"),
            Self::Rejected(msg) => write!(f, "sms gateway rejected the message: {msg}"),
        }
    }
}

impl std::error::Error for SmsError {}

impl Transient for SmsError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for SmsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            return Self::Network(err.to_string());
        }
        match err.status() {
            Some(status) if status.is_server_error() => Self::Network(err.to_string()),
            _ => Self::Rejected(err.to_string()),
        }
    }
}

/// Capability of delivering a text message to a phone number
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SmsSender: Send + Sync {
    fn provider(&self) -> &'static str;

    /// `phone` is in E.164 format
    async fn send(&self, phone: &str, message: &str) -> Result<DeliveryReceipt, SmsError>;
}

/// Build the sms sender for the configured provider
pub fn build_sms_sender(config: &SmsConfig) -> anyhow::Result<Arc<dyn SmsSender>> {
    let sender: Arc<dyn SmsSender> = match config {
        SmsConfig::Log => Arc::new(LogSmsSender),
        SmsConfig::Fast2Sms { api_key } => Arc::new(Fast2SmsSender::new(http_client()?, api_key)),
        SmsConfig::Twilio {
            account_sid,
            auth_token,
            from_number,
        } => Arc::new(TwilioSmsSender::new(
            http_client()?,
            account_sid,
            auth_token,
            from_number,
        )),
    };
    tracing::debug!("using sms provider: {}", sender.provider());
    Ok(sender)
}

fn http_client() -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(SMS_TIMEOUT_SECS))
        .build()?;
    Ok(client)
}

/// Text of the otp message
pub fn otp_message(code: &str) -> String {
    format!(
        "{code} is your MWAP verification code. It is valid for {OTP_VALIDITY_MINS} minutes. Do not share it with anyone."
    )
}
