use axum::async_trait;

use super::{DeliveryReceipt, SmsError, SmsSender};

/// Simulated gateway, the message only goes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    fn provider(&self) -> &'static str {
        "log"
    }

    async fn send(&self, phone: &str, message: &str) -> Result<DeliveryReceipt, SmsError> {
        tracing::info!("[SIMULATED SMS] to {phone}: {message}");
        Ok(DeliveryReceipt {
            provider: self.provider(),
            reference: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sender_always_delivers() {
        let receipt = LogSmsSender.send("+919876543210", "hello").await.unwrap();
        assert_eq!(receipt.provider, "log");
        assert_eq!(receipt.reference, None);
    }
}
