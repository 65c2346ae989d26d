use mongodb::bson::oid::ObjectId;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    store::OtpStore,
    utils::{get_epoch_ts, normalize_phone, AuthError, RetryPolicy, Transient},
};

pub struct OtpVerifier {
    store: Arc<dyn OtpStore>,
    retry: RetryPolicy,
}

impl OtpVerifier {
    pub fn new(store: Arc<dyn OtpStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Match the code against the latest unconsumed challenge of the phone
    /// and consume it. Other outstanding challenges are left untouched.
    pub async fn verify(&self, phone: &str, code: &str) -> Result<(), AuthError> {
        let phone = normalize_phone(phone);
        let challenge = self
            .retry
            .run("find otp challenge", || {
                self.store.find_latest_unconsumed(&phone, code)
            })
            .await?
            .ok_or(AuthError::InvalidCode)?;
        let now = get_epoch_ts();
        if challenge.is_expired(now) {
            tracing::debug!("otp challenge {} expired", challenge.id);
            return Err(AuthError::Expired);
        }
        let interrupted = AtomicBool::new(false);
        let (store, id, flag) = (&self.store, &challenge.id, &interrupted);
        let consumed = self
            .retry
            .run("consume otp challenge", move || async move {
                let result = store.mark_consumed(id, now).await;
                if matches!(&result, Err(err) if err.is_transient()) {
                    flag.store(true, Ordering::SeqCst);
                }
                result
            })
            .await?;
        // an attempt whose reply was lost may have consumed it already
        let consumed = consumed
            || (interrupted.load(Ordering::SeqCst) && self.consumed_at(id, now).await?);
        // someone else consumed it between the lookup and the update
        if !consumed {
            return Err(AuthError::InvalidCode);
        }
        tracing::debug!("otp challenge {} verified for {phone}", challenge.id);
        Ok(())
    }

    /// Whether the challenge carries the consume stamp `ts`
    async fn consumed_at(&self, id: &ObjectId, ts: u64) -> Result<bool, AuthError> {
        let challenge = self
            .retry
            .run("reread otp challenge", || self.store.find_challenge(id))
            .await?;
        Ok(challenge.map_or(false, |c| c.consumed && c.consumed_at == Some(ts)))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        models::OtpChallenge,
        store::{MemoryStore, MockOtpStore, StoreError},
        utils::mins_to_ms,
    };

    fn verifier(store: Arc<dyn OtpStore>) -> OtpVerifier {
        OtpVerifier::new(store, RetryPolicy::new(3, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_verify_consumes_once() {
        let store = Arc::new(MemoryStore::new());
        let otp = OtpChallenge::new("+919876543210", "482913", get_epoch_ts());
        store.insert_challenge(&otp).await.unwrap();
        let verifier = verifier(store.clone());
        verifier.verify("9876543210", "482913").await.unwrap();
        let stored = store.challenges_for("+919876543210").await;
        assert_eq!(stored[0].consumed, true);
        assert!(stored[0].consumed_at.is_some());
        let again = verifier.verify("9876543210", "482913").await;
        assert!(matches!(again, Err(AuthError::InvalidCode)));
    }

    #[tokio::test]
    async fn test_wrong_code_is_invalid() {
        let store = Arc::new(MemoryStore::new());
        let otp = OtpChallenge::new("+919876543210", "482913", get_epoch_ts());
        store.insert_challenge(&otp).await.unwrap();
        let result = verifier(store.clone())
            .verify("+919876543210", "000000")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCode)));
        // an unknown phone gives the very same answer
        let result = verifier(store).verify("+918888888888", "482913").await;
        assert!(matches!(result, Err(AuthError::InvalidCode)));
    }

    #[tokio::test]
    async fn test_expired_challenge() {
        let store = Arc::new(MemoryStore::new());
        let created = get_epoch_ts() - mins_to_ms(11);
        let otp = OtpChallenge::new("+919876543210", "482913", created);
        store.insert_challenge(&otp).await.unwrap();
        let result = verifier(store.clone())
            .verify("9876543210", "482913")
            .await;
        assert!(matches!(result, Err(AuthError::Expired)));
        // expired challenges are not consumed
        let stored = store.challenges_for("+919876543210").await;
        assert_eq!(stored[0].consumed, false);
    }

    #[tokio::test]
    async fn test_resend_keeps_both_challenges_valid() {
        let store = Arc::new(MemoryStore::new());
        let now = get_epoch_ts();
        let first = OtpChallenge::new("+919876543210", "111111", now - 1000);
        let second = OtpChallenge::new("+919876543210", "222222", now);
        store.insert_challenge(&first).await.unwrap();
        store.insert_challenge(&second).await.unwrap();
        let verifier = verifier(store.clone());
        verifier.verify("9876543210", "111111").await.unwrap();
        // only the matched challenge is consumed
        let stored = store.challenges_for("+919876543210").await;
        assert_eq!(stored[0].consumed, true);
        assert_eq!(stored[1].consumed, false);
        verifier.verify("9876543210", "222222").await.unwrap();
    }

    #[tokio::test]
    async fn test_lost_consume_race_is_invalid() {
        let otp = OtpChallenge::new("+919876543210", "482913", get_epoch_ts());
        let mut store = MockOtpStore::new();
        let found = otp.clone();
        store
            .expect_find_latest_unconsumed()
            .times(1)
            .returning(move |_, _| Ok(Some(found.clone())));
        store
            .expect_mark_consumed()
            .times(1)
            .returning(|_, _| Ok(false));
        let result = verifier(Arc::new(store))
            .verify("9876543210", "482913")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCode)));
    }

    #[tokio::test]
    async fn test_consume_reply_lost_after_update() {
        let otp = OtpChallenge::new("+919876543210", "482913", get_epoch_ts());
        let stamped = Arc::new(std::sync::Mutex::new(None));
        let mut store = MockOtpStore::new();
        let found = otp.clone();
        store
            .expect_find_latest_unconsumed()
            .times(1)
            .returning(move |_, _| Ok(Some(found.clone())));
        // the first update lands but its reply is lost, the retry then finds it consumed
        let mut calls = 0;
        let seen = stamped.clone();
        store.expect_mark_consumed().times(2).returning(move |_, ts| {
            calls += 1;
            if calls == 1 {
                *seen.lock().unwrap() = Some(ts);
                return Err(StoreError::Network("connection reset".into()));
            }
            Ok(false)
        });
        let reread = stamped.clone();
        store.expect_find_challenge().times(1).returning(move |_| {
            let mut consumed = otp.clone();
            consumed.consumed = true;
            consumed.consumed_at = *reread.lock().unwrap();
            Ok(Some(consumed))
        });
        let result = verifier(Arc::new(store))
            .verify("9876543210", "482913")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_consume_lost_to_other_after_network_failure() {
        let otp = OtpChallenge::new("+919876543210", "482913", get_epoch_ts());
        let mut store = MockOtpStore::new();
        let found = otp.clone();
        store
            .expect_find_latest_unconsumed()
            .times(1)
            .returning(move |_, _| Ok(Some(found.clone())));
        let mut calls = 0;
        store.expect_mark_consumed().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                return Err(StoreError::Network("connection reset".into()));
            }
            Ok(false)
        });
        // consumed by a concurrent verification with an older stamp
        store.expect_find_challenge().times(1).returning(move |_| {
            let mut consumed = otp.clone();
            consumed.consumed = true;
            consumed.consumed_at = Some(1);
            Ok(Some(consumed))
        });
        let result = verifier(Arc::new(store))
            .verify("9876543210", "482913")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCode)));
    }

    #[tokio::test]
    async fn test_lookup_network_failure() {
        let mut store = MockOtpStore::new();
        store
            .expect_find_latest_unconsumed()
            .times(3)
            .returning(|_, _| Err(StoreError::Network("no primary".into())));
        let result = verifier(Arc::new(store))
            .verify("9876543210", "482913")
            .await;
        assert!(matches!(result, Err(AuthError::TransientNetwork)));
    }
}
