use std::sync::Arc;
use tokio::task::JoinHandle;

use self::cleanup::cleanup_job;
use crate::otp::OtpRecordStore;

pub mod cleanup;

/// Spawn the background jobs, the handles are aborted on shutdown
pub fn spawn_all_jobs(store: Arc<dyn OtpRecordStore>, cleanup_interval_secs: u64) -> Vec<JoinHandle<()>> {
    // spawn job to purge expired otp records the ttl index has not removed yet
    let cleanup = tokio::spawn(async move {
        cleanup_job(store, cleanup_interval_secs).await;
    });
    vec![cleanup]
}
