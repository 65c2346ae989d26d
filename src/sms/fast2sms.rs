use axum::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use super::{DeliveryReceipt, SmsError, SmsSender};
use crate::{constants::*, utils::local_number};

#[derive(Debug, Serialize, PartialEq)]
struct Fast2SmsPayload {
    route: &'static str,
    message: String,
    language: &'static str,
    flash: u8,
    numbers: String,
}

impl Fast2SmsPayload {
    /// The gateway only takes domestic 10 digit numbers
    fn new(phone: &str, message: &str) -> Result<Self, SmsError> {
        let numbers = local_number(phone)
            .ok_or_else(|| SmsError::Rejected(format!("not a domestic number: {phone}")))?;
        Ok(Self {
            route: "q",
            message: message.to_owned(),
            language: "english",
            flash: 0,
            numbers,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Fast2SmsResponse {
    #[serde(rename = "return")]
    accepted: bool,
    request_id: Option<String>,
    #[serde(default)]
    message: serde_json::Value,
}

/// Fast2SMS bulk v2 gateway
pub struct Fast2SmsSender {
    client: reqwest::Client,
    api_key: String,
}

impl Fast2SmsSender {
    pub fn new(client: reqwest::Client, api_key: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_owned(),
        }
    }
}

#[async_trait]
impl SmsSender for Fast2SmsSender {
    fn provider(&self) -> &'static str {
        "fast2sms"
    }

    async fn send(&self, phone: &str, message: &str) -> Result<DeliveryReceipt, SmsError> {
        let payload = Fast2SmsPayload::new(phone, message)?;
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| SmsError::Rejected("invalid api key header".into()))?;
        headers.insert(AUTHORIZATION, key);
        let res = self
            .client
            .post(FAST2SMS_ENDPOINT)
            .headers(headers)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json::<Fast2SmsResponse>()
            .await?;
        if !res.accepted {
            return Err(SmsError::Rejected(res.message.to_string()));
        }
        Ok(DeliveryReceipt {
            provider: self.provider(),
            reference: res.request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_uses_local_number() {
        let payload = Fast2SmsPayload::new("+919876543210", "1234 is your code").unwrap();
        assert_eq!(payload.numbers, "9876543210");
        assert_eq!(payload.route, "q");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["numbers"], "9876543210");
        assert_eq!(json["flash"], 0);
    }

    #[test]
    fn test_payload_rejects_foreign_number() {
        let err = Fast2SmsPayload::new("+14155550100", "code").unwrap_err();
        assert!(matches!(err, SmsError::Rejected(_)));
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"return":true,"request_id":"abc123","message":["SMS sent successfully."]}"#;
        let res: Fast2SmsResponse = serde_json::from_str(body).unwrap();
        assert!(res.accepted);
        assert_eq!(res.request_id.as_deref(), Some("abc123"));
        let body = r#"{"return":false,"status_code":412,"message":"Invalid Authentication"}"#;
        let res: Fast2SmsResponse = serde_json::from_str(body).unwrap();
        assert!(!res.accepted);
    }
}
