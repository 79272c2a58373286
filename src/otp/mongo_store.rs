use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReplaceOptions},
};
use std::{sync::Arc, time::Duration};

use super::store::{OtpRecordStore, UpsertAck};
use crate::{constants::*, models::OtpRecord, utils::to_bson_datetime};

#[cfg(not(test))]
use crate::database::AppDatabase;
#[cfg(test)]
use crate::database::MockAppDatabase as AppDatabase;

/// Otp records kept in the `otps` MongoDB collection
pub struct MongoOtpStore {
    db: Arc<AppDatabase>,
}

impl MongoOtpStore {
    pub fn new(db: Arc<AppDatabase>) -> Self {
        Self { db }
    }

    /// Create the indexes the store relies on
    ///
    /// The partial unique index keeps a single unverified record per phone
    /// number even when upserts race. A losing upsert is either retried by
    /// the server as an update or rejected with a duplicate key error, which
    /// surfaces as a failed issue. The TTL index lets MongoDB drop expired
    /// records.
    pub async fn ensure_indexes(&self) -> anyhow::Result<()> {
        let unique_unverified = IndexOptions::builder()
            .name("phoneNumber_unverified".to_owned())
            .unique(true)
            .partial_filter_expression(doc! {"verified": false})
            .build();
        self.db
            .create_index(COLL_OTP, doc! {"phoneNumber": 1}, unique_unverified)
            .await?;

        let ttl = IndexOptions::builder()
            .name("expiresAt_ttl".to_owned())
            .expire_after(Duration::from_secs(0))
            .build();
        self.db
            .create_index(COLL_OTP, doc! {"expiresAt": 1}, ttl)
            .await?;
        tracing::debug!("otp indexes are in place");
        Ok(())
    }
}

#[async_trait]
impl OtpRecordStore for MongoOtpStore {
    async fn upsert_unverified(&self, record: OtpRecord) -> anyhow::Result<UpsertAck> {
        let filter = doc! {"phoneNumber": &record.phone_number, "verified": false};
        let options = ReplaceOptions::builder().upsert(true).build();
        let summary = self
            .db
            .replace_one(COLL_OTP, filter, &record, Some(options))
            .await?;
        let ack = UpsertAck {
            matched: summary.matched,
            modified: summary.modified,
            upserted: summary.upserted,
        };
        Ok(ack)
    }

    async fn find_unverified(
        &self,
        phone_number: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<OtpRecord>> {
        let filter = doc! {
            "phoneNumber": phone_number,
            "verified": false,
            "expiresAt": {"$gt": to_bson_datetime(now)},
        };
        let record = self
            .db
            .find_one::<OtpRecord>(COLL_OTP, Some(filter), None)
            .await?;
        Ok(record)
    }

    async fn consume_if_valid(
        &self,
        phone_number: &str,
        otp_hash: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<OtpRecord>> {
        let filter = doc! {
            "phoneNumber": phone_number,
            "otpHash": otp_hash,
            "verified": false,
            "expiresAt": {"$gt": to_bson_datetime(now)},
        };
        let record = self
            .db
            .find_one_and_delete::<OtpRecord>(COLL_OTP, filter, None)
            .await?;
        Ok(record)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64> {
        let filter = doc! {"expiresAt": {"$lte": to_bson_datetime(now)}};
        let deleted = self.db.delete_many(COLL_OTP, filter, None).await?;
        Ok(deleted)
    }
}
