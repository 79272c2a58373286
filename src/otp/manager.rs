use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use super::store::OtpRecordStore;
use crate::{constants::OTP_MAX_EXPIRY_SECS, models::OtpRecord, utils::mask_phone};

/// Result of storing a freshly issued code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOutcome {
    Stored,
    StorageUnavailable,
    WriteFailed,
}

impl IssueOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored)
    }
}

/// Issues and verifies one-time codes for canonical phone keys
///
/// Keys are expected to be normalized already. All coordination between
/// concurrent calls is left to the store's atomic operations.
pub struct OtpManager {
    store: Arc<dyn OtpRecordStore>,
    ttl: Duration,
}

impl OtpManager {
    pub fn new(store: Arc<dyn OtpRecordStore>, ttl_secs: u64) -> Self {
        if ttl_secs > OTP_MAX_EXPIRY_SECS {
            tracing::warn!("Otp ttl of {ttl_secs}s is clamped to {OTP_MAX_EXPIRY_SECS}s");
        }
        let ttl_secs = ttl_secs.min(OTP_MAX_EXPIRY_SECS) as i64;
        Self {
            store,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn issue(&self, phone_number: &str, otp: &str) -> IssueOutcome {
        self.issue_at(phone_number, otp, Utc::now()).await
    }

    /// Store `otp` for the key, replacing any unverified code issued before
    pub async fn issue_at(&self, phone_number: &str, otp: &str, now: DateTime<Utc>) -> IssueOutcome {
        let masked = mask_phone(phone_number);
        let record = OtpRecord::new(phone_number, otp, now, self.ttl);
        match self.store.upsert_unverified(record).await {
            Ok(ack) if ack.inserted_or_modified() => {
                tracing::info!("Otp stored for phone number: {masked}");
                IssueOutcome::Stored
            }
            Ok(ack) => {
                tracing::warn!("Failed to store otp for phone number: {masked}. Result: {ack:?}");
                IssueOutcome::WriteFailed
            }
            Err(err) => {
                tracing::error!("Storage error while storing otp for {masked}: {err:?}");
                IssueOutcome::StorageUnavailable
            }
        }
    }

    pub async fn verify(&self, phone_number: &str, otp: &str) -> bool {
        self.verify_at(phone_number, otp, Utc::now()).await
    }

    /// Consume the code if it matches the live record for the key
    ///
    /// Returns `false` without saying why: wrong code, expired, already used,
    /// never issued and storage failures all look the same to the caller.
    pub async fn verify_at(&self, phone_number: &str, otp: &str, now: DateTime<Utc>) -> bool {
        let masked = mask_phone(phone_number);
        match self.try_consume(phone_number, otp, now).await {
            Ok(true) => {
                tracing::info!("Otp verified and removed for phone number: {masked}");
                true
            }
            Ok(false) => {
                tracing::warn!("Otp verification failed for {masked}");
                false
            }
            Err(err) => {
                tracing::error!("Storage error while verifying otp for {masked}: {err:?}");
                false
            }
        }
    }

    async fn try_consume(
        &self,
        phone_number: &str,
        otp: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        // the salt is per record, so the live record is read first
        let Some(record) = self.store.find_unverified(phone_number, now).await? else {
            return Ok(false);
        };
        let otp_hash = record.digest_of(otp)?;
        // a re-issue in between changes the stored digest and the delete misses
        let consumed = self
            .store
            .consume_if_valid(phone_number, &otp_hash, now)
            .await?;
        Ok(consumed.is_some())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::otp::{store::MockOtpRecordStore, store::UpsertAck, MemoryOtpStore};

    const PHONE: &str = "+989123456789";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn memory_manager(ttl_secs: u64) -> (Arc<MemoryOtpStore>, OtpManager) {
        let store = Arc::new(MemoryOtpStore::new());
        let manager = OtpManager::new(store.clone(), ttl_secs);
        (store, manager)
    }

    #[test]
    fn test_ttl_is_clamped() {
        let (_, manager) = memory_manager(OTP_MAX_EXPIRY_SECS + 1);
        assert_eq!(manager.ttl(), Duration::seconds(OTP_MAX_EXPIRY_SECS as i64));
        let (_, manager) = memory_manager(300);
        assert_eq!(manager.ttl(), Duration::seconds(300));
    }

    #[tokio::test]
    async fn test_issue_then_verify_once() {
        let (_, manager) = memory_manager(300);
        let outcome = manager.issue_at(PHONE, "482913", t0()).await;
        assert_eq!(outcome, IssueOutcome::Stored);
        assert!(manager.verify_at(PHONE, "482913", t0() + Duration::seconds(10)).await);
        assert!(!manager.verify_at(PHONE, "482913", t0() + Duration::seconds(11)).await);
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_record() {
        let (store, manager) = memory_manager(300);
        manager.issue_at(PHONE, "482913", t0()).await;
        assert!(!manager.verify_at(PHONE, "000000", t0() + Duration::seconds(1)).await);
        assert_eq!(store.records_for(PHONE).unwrap().len(), 1);
        assert!(manager.verify_at(PHONE, "482913", t0() + Duration::seconds(2)).await);
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected() {
        let (_, manager) = memory_manager(300);
        manager.issue_at(PHONE, "482913", t0()).await;
        assert!(!manager.verify_at(PHONE, "482913", t0() + Duration::seconds(300)).await);
        assert!(!manager.verify_at(PHONE, "482913", t0() + Duration::seconds(3600)).await);
    }

    #[tokio::test]
    async fn test_reissue_replaces_previous_code() {
        let (store, manager) = memory_manager(300);
        manager.issue_at(PHONE, "111111", t0()).await;
        let t1 = t0() + Duration::seconds(30);
        manager.issue_at(PHONE, "222222", t1).await;

        let records = store.records_for(PHONE).unwrap();
        assert_eq!(records.len(), 1);
        let expected_expiry = (t1 + Duration::seconds(300)).timestamp_millis();
        assert_eq!(records[0].expires_at.timestamp_millis(), expected_expiry);

        let now = t1 + Duration::seconds(1);
        assert!(!manager.verify_at(PHONE, "111111", now).await);
        assert!(manager.verify_at(PHONE, "222222", now).await);
    }

    #[tokio::test]
    async fn test_code_is_not_stored_in_plaintext() {
        let (store, manager) = memory_manager(300);
        manager.issue_at(PHONE, "482913", t0()).await;
        let record = store.records_for(PHONE).unwrap().remove(0);
        assert_ne!(record.otp_hash, "482913");
        assert_eq!(record.otp_hash.len(), 64);
        let doc = mongodb::bson::to_document(&record).unwrap();
        let has_plain = doc.values().any(|val| val.as_str() == Some("482913"));
        assert_eq!(has_plain, false);
    }

    #[tokio::test]
    async fn test_never_issued_is_rejected() {
        let (_, manager) = memory_manager(300);
        assert!(!manager.verify_at(PHONE, "482913", t0()).await);
    }

    #[tokio::test]
    async fn test_issue_storage_error() {
        let mut store = MockOtpRecordStore::new();
        store
            .expect_upsert_unverified()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("connection reset")));
        let manager = OtpManager::new(Arc::new(store), 300);
        let outcome = manager.issue(PHONE, "482913").await;
        assert_eq!(outcome, IssueOutcome::StorageUnavailable);
        assert_eq!(outcome.is_stored(), false);
    }

    #[tokio::test]
    async fn test_issue_acknowledged_noop() {
        let mut store = MockOtpRecordStore::new();
        store
            .expect_upsert_unverified()
            .times(1)
            .returning(|_| {
                Ok(UpsertAck {
                    matched: 1,
                    modified: 0,
                    upserted: false,
                })
            });
        let manager = OtpManager::new(Arc::new(store), 300);
        let outcome = manager.issue(PHONE, "482913").await;
        assert_eq!(outcome, IssueOutcome::WriteFailed);
    }

    #[tokio::test]
    async fn test_issue_passes_record_to_store() {
        let mut store = MockOtpRecordStore::new();
        store
            .expect_upsert_unverified()
            .withf(|record: &OtpRecord| {
                record.phone_number == PHONE
                    && !record.verified
                    && record.expires_at.timestamp_millis()
                        - record.created_at.timestamp_millis()
                        == 120_000
            })
            .times(1)
            .returning(|_| {
                Ok(UpsertAck {
                    matched: 0,
                    modified: 0,
                    upserted: true,
                })
            });
        let manager = OtpManager::new(Arc::new(store), 120);
        assert!(manager.issue(PHONE, "482913").await.is_stored());
    }

    #[tokio::test]
    async fn test_verify_storage_error_is_false() {
        let mut store = MockOtpRecordStore::new();
        store
            .expect_find_unverified()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("server selection timeout")));
        store.expect_consume_if_valid().times(0);
        let manager = OtpManager::new(Arc::new(store), 300);
        assert!(!manager.verify(PHONE, "482913").await);
    }

    #[tokio::test]
    async fn test_verify_skips_consume_without_live_record() {
        let mut store = MockOtpRecordStore::new();
        store
            .expect_find_unverified()
            .times(1)
            .returning(|_, _| Ok(None));
        store.expect_consume_if_valid().times(0);
        let manager = OtpManager::new(Arc::new(store), 300);
        assert!(!manager.verify(PHONE, "482913").await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_verify_consumes_once() {
        let (_, manager) = memory_manager(300);
        let manager = Arc::new(manager);
        manager.issue(PHONE, "482913").await;
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.verify(PHONE, "482913").await })
            })
            .collect();
        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_issue_converges() {
        let (store, manager) = memory_manager(300);
        let manager = Arc::new(manager);
        let codes: Vec<String> = (0..16).map(|i| format!("{:06}", 100000 + i)).collect();
        let handles: Vec<_> = codes
            .iter()
            .cloned()
            .map(|code| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.issue(PHONE, &code).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_stored());
        }

        let records = store.records_for(PHONE).unwrap();
        assert_eq!(records.len(), 1);
        let winners: Vec<&String> = codes
            .iter()
            .filter(|code| records[0].digest_of(code).unwrap() == records[0].otp_hash)
            .collect();
        assert_eq!(winners.len(), 1);
        assert!(manager.verify(PHONE, winners[0]).await);
    }
}
