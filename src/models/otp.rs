use chrono::{DateTime, Duration, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::{generate_salt, hash_otp, to_bson_datetime};

/// One issued verification code for a phone number
///
/// The code itself is never persisted, only its salted digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtpRecord {
    pub phone_number: String,
    pub salt: String,
    pub otp_hash: String,
    pub created_at: BsonDateTime,
    pub expires_at: BsonDateTime,
    pub verified: bool,
}

impl OtpRecord {
    pub fn new(phone_number: &str, otp: &str, now: DateTime<Utc>, ttl: Duration) -> Self {
        let salt = generate_salt();
        Self {
            phone_number: phone_number.to_owned(),
            salt: hex::encode(salt),
            otp_hash: hash_otp(otp, &salt),
            created_at: to_bson_datetime(now),
            expires_at: to_bson_datetime(now + ttl),
            verified: false,
        }
    }

    /// Digest of a candidate code using this record's salt
    pub fn digest_of(&self, otp: &str) -> anyhow::Result<String> {
        let salt = hex::decode(&self.salt)?;
        Ok(hash_otp(otp, &salt))
    }

    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        !self.verified && self.expires_at > to_bson_datetime(now)
    }
}
