use axum::async_trait;
use std::time::Duration;

use mwap_backend::sms::{DeliveryReceipt, SmsError, SmsSender};

/// Gateway which refuses every message
pub struct RejectingSms;

#[async_trait]
impl SmsSender for RejectingSms {
    fn provider(&self) -> &'static str {
        "rejecting"
    }

    async fn send(&self, _phone: &str, _message: &str) -> Result<DeliveryReceipt, SmsError> {
        Err(SmsError::Rejected("sender id not approved".into()))
    }
}

/// Gateway which holds every request and then fails with a network error
pub struct HangingSms;

#[async_trait]
impl SmsSender for HangingSms {
    fn provider(&self) -> &'static str {
        "hanging"
    }

    async fn send(&self, _phone: &str, _message: &str) -> Result<DeliveryReceipt, SmsError> {
        tokio::time::sleep(Duration::from_secs(15)).await;
        Err(SmsError::Network("gateway did not answer".into()))
    }
}
