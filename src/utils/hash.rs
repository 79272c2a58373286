use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::constants::OTP_SALT_LEN;

/// Generate a random salt from the operating system CSPRNG
pub fn generate_salt() -> [u8; OTP_SALT_LEN] {
    let mut salt = [0u8; OTP_SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Hex encoded SHA-256 of `salt || otp`
pub fn hash_otp(otp: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(otp.as_bytes());
    hex::encode(hasher.finalize())
}
