use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::OtpRecord;

#[cfg(test)]
use mockall::automock;

/// What the storage engine reported for a replace-upsert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertAck {
    pub matched: u64,
    pub modified: u64,
    pub upserted: bool,
}

impl UpsertAck {
    pub fn inserted_or_modified(&self) -> bool {
        self.modified > 0 || self.upserted
    }
}

/// Durable keyed storage for otp records
///
/// Implementations must make `upsert_unverified` and `consume_if_valid`
/// atomic per record. Nothing else mutates otp records.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OtpRecordStore: Send + Sync {
    /// Replace the unverified record for `record.phone_number`, or insert
    /// it when none exists
    async fn upsert_unverified(&self, record: OtpRecord) -> anyhow::Result<UpsertAck>;

    /// Fetch the unverified record for a key that is still live at `now`
    async fn find_unverified(
        &self,
        phone_number: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<OtpRecord>>;

    /// Atomically find and delete the unverified, unexpired record for a key
    /// whose digest equals `otp_hash`
    async fn consume_if_valid(
        &self,
        phone_number: &str,
        otp_hash: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<OtpRecord>>;

    /// Delete every record that expired at or before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64>;
}
