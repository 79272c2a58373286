use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

use super::store::{OtpRecordStore, UpsertAck};
use crate::{models::OtpRecord, utils::to_bson_datetime};

/// Process local otp store for tests and local runs
///
/// Every operation holds the lock for its whole read-modify-write, which
/// gives the same per-record atomicity as the MongoDB store.
#[derive(Default)]
pub struct MemoryOtpStore {
    records: Mutex<Vec<OtpRecord>>,
}

impl MemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Vec<OtpRecord>>> {
        self.records
            .lock()
            .map_err(|_| anyhow::anyhow!("otp store lock poisoned"))
    }

    /// Snapshot of every stored record for a key, expired ones included
    pub fn records_for(&self, phone_number: &str) -> anyhow::Result<Vec<OtpRecord>> {
        let records = self.lock()?;
        let found = records
            .iter()
            .filter(|rec| rec.phone_number == phone_number)
            .cloned()
            .collect();
        Ok(found)
    }
}

#[async_trait]
impl OtpRecordStore for MemoryOtpStore {
    async fn upsert_unverified(&self, record: OtpRecord) -> anyhow::Result<UpsertAck> {
        let mut records = self.lock()?;
        let existing = records
            .iter_mut()
            .find(|rec| rec.phone_number == record.phone_number && !rec.verified);
        let ack = match existing {
            Some(rec) => {
                let modified = u64::from(*rec != record);
                *rec = record;
                UpsertAck {
                    matched: 1,
                    modified,
                    upserted: false,
                }
            }
            None => {
                records.push(record);
                UpsertAck {
                    matched: 0,
                    modified: 0,
                    upserted: true,
                }
            }
        };
        Ok(ack)
    }

    async fn find_unverified(
        &self,
        phone_number: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<OtpRecord>> {
        let records = self.lock()?;
        let found = records
            .iter()
            .find(|rec| rec.phone_number == phone_number && rec.is_live_at(now))
            .cloned();
        Ok(found)
    }

    async fn consume_if_valid(
        &self,
        phone_number: &str,
        otp_hash: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<OtpRecord>> {
        let mut records = self.lock()?;
        let pos = records.iter().position(|rec| {
            rec.phone_number == phone_number && rec.otp_hash == otp_hash && rec.is_live_at(now)
        });
        Ok(pos.map(|pos| records.remove(pos)))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64> {
        let mut records = self.lock()?;
        let cut_off = to_bson_datetime(now);
        let before = records.len();
        records.retain(|rec| rec.expires_at > cut_off);
        Ok((before - records.len()) as u64)
    }
}
