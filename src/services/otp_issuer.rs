use mongodb::bson::oid::ObjectId;
use std::{sync::Arc, time::Duration};
use tokio::time::timeout;

use crate::{
    config::OtpConfig,
    constants::SMS_DELIVERY_BUDGET_SECS,
    models::OtpChallenge,
    sms::{otp_message, DeliveryReceipt, SmsSender},
    store::OtpStore,
    utils::{generate_otp, get_epoch_ts, normalize_phone, AuthError, RetryPolicy},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered(DeliveryReceipt),
    /// the challenge is stored but the gateway did not take the message
    Undelivered(String),
}

/// A stored otp challenge along with its delivery outcome
#[derive(Debug, Clone)]
pub struct IssuedOtp {
    pub challenge_id: ObjectId,
    pub phone: String,
    pub code: String,
    pub expires_at: u64,
    pub delivery: DeliveryStatus,
}

impl IssuedOtp {
    pub fn is_delivered(&self) -> bool {
        matches!(self.delivery, DeliveryStatus::Delivered(_))
    }
}

pub struct OtpIssuer {
    store: Arc<dyn OtpStore>,
    sms: Arc<dyn SmsSender>,
    config: OtpConfig,
    retry: RetryPolicy,
}

impl OtpIssuer {
    pub fn new(
        store: Arc<dyn OtpStore>,
        sms: Arc<dyn SmsSender>,
        config: OtpConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            sms,
            config,
            retry,
        }
    }

    /// Generate, store and deliver a fresh otp for the phone.
    /// Issuance succeeds once the challenge is stored, delivery failures are
    /// reported in the outcome unless delivery is required by config.
    pub async fn issue(&self, phone: &str) -> Result<IssuedOtp, AuthError> {
        let phone = normalize_phone(phone);
        let code = generate_otp(self.config.length);
        let challenge = OtpChallenge::new(&phone, &code, get_epoch_ts());
        self.retry
            .run("store otp challenge", || self.store.insert_challenge(&challenge))
            .await?;
        tracing::debug!("otp challenge {} stored for {phone}", challenge.id);

        let message = otp_message(&code);
        let budget = Duration::from_secs(SMS_DELIVERY_BUDGET_SECS);
        let sending = self
            .retry
            .run("send otp sms", || self.sms.send(&phone, &message));
        let delivery = match timeout(budget, sending).await {
            Ok(Ok(receipt)) => DeliveryStatus::Delivered(receipt),
            Ok(Err(err)) => {
                tracing::warn!("otp for {phone} stored but not delivered: {err}");
                DeliveryStatus::Undelivered(err.to_string())
            }
            Err(_) => {
                tracing::warn!("otp for {phone} stored but sms gateway did not answer in time");
                DeliveryStatus::Undelivered(format!(
                    "no gateway answer within {SMS_DELIVERY_BUDGET_SECS}s"
                ))
            }
        };
        if let DeliveryStatus::Undelivered(reason) = &delivery {
            if self.config.require_delivery {
                return Err(AuthError::Delivery(reason.clone()));
            }
        }

        Ok(IssuedOtp {
            challenge_id: challenge.id,
            phone,
            code,
            expires_at: challenge.expires_at,
            delivery,
        })
    }
}
