pub mod manager;
pub mod memory_store;
pub mod mongo_store;
pub mod store;

pub use manager::{IssueOutcome, OtpManager};
pub use memory_store::MemoryOtpStore;
pub use mongo_store::MongoOtpStore;
pub use store::{OtpRecordStore, UpsertAck};

#[cfg(test)]
pub use store::MockOtpRecordStore;
