use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};
use tokio::time::interval;

use crate::otp::OtpRecordStore;

/// This function periodically deletes the expired OTP records from database
pub async fn cleanup_job(store: Arc<dyn OtpRecordStore>, interval_secs: u64) {
    tracing::debug!("initializing cleanup scheduler job");
    let mut interval = interval(Duration::from_secs(interval_secs));
    loop {
        interval.tick().await;
        if let Err(err) = purge_expired_otps(store.as_ref(), Utc::now()).await {
            tracing::debug!("Error in otp deletion: {:?}", err);
        }
    }
}

/// Delete every record which is expired at `now`
pub async fn purge_expired_otps(store: &dyn OtpRecordStore, now: DateTime<Utc>) -> anyhow::Result<u64> {
    let deleted = store.purge_expired(now).await?;
    if deleted > 0 {
        tracing::debug!("Deleted {deleted} expired otp records");
    }
    Ok(deleted)
}
