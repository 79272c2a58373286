use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_DIALABLE: Regex = Regex::new(r"[^0-9+]").unwrap();
}

/// Converts a user entered phone number into the canonical key used for
/// otp and user lookups.
///
/// This never rejects input. Numbers that are already international with a
/// different country code, or fragments that match none of the local
/// patterns, are returned with only the formatting characters removed.
pub fn normalize_phone(raw: &str, country_prefix: &str) -> String {
    // keep only ascii digits and a single leading '+'
    let stripped = NON_DIALABLE.replace_all(raw, "");
    let cleaned = match stripped.strip_prefix('+') {
        Some(rest) => format!("+{}", rest.replace('+', "")),
        None => stripped.replace('+', ""),
    };

    if let Some(rest) = cleaned.strip_prefix("00") {
        return format!("+{rest}");
    }
    if let Some(rest) = cleaned.strip_prefix('0') {
        return format!("{country_prefix}{rest}");
    }
    // a national number typed without the trunk prefix, e.g. 9123456789
    if !cleaned.starts_with('+') && cleaned.len() == 10 && cleaned.starts_with('9') {
        return format!("{country_prefix}{cleaned}");
    }

    cleaned
}
