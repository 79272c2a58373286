use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use rand::{thread_rng, Rng};

/// Generate OTP of a given length
/// the first digit is never '0' since the SMS gateway receives the code as a number
pub fn generate_otp(len: u32) -> String {
    let mut rng = thread_rng();
    (0..len)
        .map(|i| {
            let low = if i == 0 { 1 } else { 0 };
            let n = rng.gen_range(low..10);
            char::from_digit(n, 10).unwrap_or('0')
        })
        .collect()
}

/// Convert a chrono timestamp into a BSON date with millisecond precision
pub fn to_bson_datetime(ts: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(ts.timestamp_millis())
}

/// Mask all but the last 4 characters of a phone number for logging
pub fn mask_phone(phone: &str) -> String {
    let len = phone.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }
    phone
        .chars()
        .enumerate()
        .map(|(i, ch)| if i < len - 4 { '*' } else { ch })
        .collect()
}
