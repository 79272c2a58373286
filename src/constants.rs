pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PORT: u16 = 3000;
pub const MONGO_MIN_POOL_SIZE: u32 = 5;
pub const MONGO_MAX_POOL_SIZE: u32 = 10;
pub const MONGO_CONN_TIMEOUT: u64 = 10;
pub const OTP_LENGTH: u32 = 6;
pub const OTP_EXPIRY_SECS: u64 = 5 * 60;
pub const OTP_MAX_EXPIRY_SECS: u64 = 24 * 60 * 60;
pub const OTP_SALT_LEN: usize = 16;
pub const OTP_CLEANUP_JOB_INTERVAL: u64 = 60 * 60;
pub const DEFAULT_COUNTRY_PREFIX: &str = "+98";
pub const API_KEY_HEADER: &str = "x-api-key";
pub const SMS_SENDING_TYPE: &str = "pattern";

pub const DB_NAME: &str = "verify_db";

pub const COLL_OTP: &str = "otps";
pub const COLL_USERS: &str = "users";
