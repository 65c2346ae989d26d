use axum::async_trait;
use serde::Deserialize;

use super::{DeliveryReceipt, SmsError, SmsSender};
use crate::constants::*;

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: Option<String>,
    status: Option<String>,
}

/// Twilio programmable messaging gateway
pub struct TwilioSmsSender {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioSmsSender {
    pub fn new(
        client: reqwest::Client,
        account_sid: &str,
        auth_token: &str,
        from_number: &str,
    ) -> Self {
        Self {
            client,
            account_sid: account_sid.to_owned(),
            auth_token: auth_token.to_owned(),
            from_number: from_number.to_owned(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API_BASE, self.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    fn provider(&self) -> &'static str {
        "twilio"
    }

    async fn send(&self, phone: &str, message: &str) -> Result<DeliveryReceipt, SmsError> {
        let form = [
            ("To", phone),
            ("From", self.from_number.as_str()),
            ("Body", message),
        ];
        let res = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json::<TwilioMessage>()
            .await?;
        if matches!(res.status.as_deref(), Some("failed") | Some("undelivered")) {
            let sid = res.sid.unwrap_or_default();
            return Err(SmsError::Rejected(format!("message {sid} was not delivered")));
        }
        Ok(DeliveryReceipt {
            provider: self.provider(),
            reference: res.sid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url() {
        let sender =
            TwilioSmsSender::new(reqwest::Client::new(), "AC123", "token", "+15005550006");
        assert_eq!(
            sender.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_message_parsing() {
        let body = r#"{"sid":"SM1","status":"queued","to":"+919876543210"}"#;
        let msg: TwilioMessage = serde_json::from_str(body).unwrap();
        assert_eq!(msg.sid.as_deref(), Some("SM1"));
        assert_eq!(msg.status.as_deref(), Some("queued"));
    }
}
