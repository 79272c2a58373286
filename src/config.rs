use anyhow::{anyhow, Context};
use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;

use crate::constants::*;

lazy_static! {
    static ref COUNTRY_PREFIX_RE: Regex = Regex::new(r"^\+[0-9]{1,4}$").unwrap();
}

/// Settings for the pattern based SMS gateway
#[derive(Debug, Clone, PartialEq)]
pub struct SmsConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender_number: String,
    pub pattern_code: String,
}

/// Application settings, read once at startup and passed down explicitly
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_min_pool: u32,
    pub mongodb_max_pool: u32,
    pub db_name: String,
    pub otp_ttl_secs: u64,
    pub otp_length: u32,
    pub country_prefix: String,
    pub api_key: String,
    pub sms: Option<SmsConfig>,
    pub sms_dry_run: bool,
    pub cleanup_interval_secs: u64,
}

impl AppConfig {
    /// Read the settings from the process environment
    /// `.env` should be loaded with dotenvy before calling this
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the settings from any key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());
        let required = |key: &str| get(key).ok_or(anyhow!("{key} not found in environment"));

        let country_prefix = get("PHONE_COUNTRY_PREFIX").unwrap_or(DEFAULT_COUNTRY_PREFIX.into());
        if !COUNTRY_PREFIX_RE.is_match(&country_prefix) {
            let err = anyhow!("PHONE_COUNTRY_PREFIX must look like +98, received: {country_prefix}");
            return Err(err);
        }

        let otp_ttl_secs = parse_or(get("OTP_EXPIRY_SECONDS"), "OTP_EXPIRY_SECONDS", OTP_EXPIRY_SECS)?;
        if otp_ttl_secs == 0 || otp_ttl_secs > OTP_MAX_EXPIRY_SECS {
            let err = anyhow!("OTP_EXPIRY_SECONDS must be between 1 and {OTP_MAX_EXPIRY_SECS}");
            return Err(err);
        }
        let otp_length = parse_or(get("OTP_LENGTH"), "OTP_LENGTH", OTP_LENGTH)?;
        if !(4..=6).contains(&otp_length) {
            return Err(anyhow!("OTP_LENGTH must be between 4 and 6"));
        }

        // without a gateway nothing is delivered, which has to be asked for explicitly
        let sms_dry_run = parse_or(get("SMS_DRY_RUN"), "SMS_DRY_RUN", false)?;
        let sms = match get("SMS_API_URL") {
            Some(api_url) => Some(SmsConfig {
                api_url,
                api_key: required("SMS_API_KEY")?,
                sender_number: required("SMS_SENDER_NUMBER")?,
                pattern_code: required("SMS_PATTERN_CODE")?,
            }),
            None if sms_dry_run => None,
            None => {
                let err = anyhow!("SMS_API_URL not found in environment, set SMS_DRY_RUN=true to skip delivery");
                return Err(err);
            }
        };

        let cleanup_interval_secs = parse_or(
            get("OTP_CLEANUP_INTERVAL_SECS"),
            "OTP_CLEANUP_INTERVAL_SECS",
            OTP_CLEANUP_JOB_INTERVAL,
        )?;
        if cleanup_interval_secs == 0 {
            return Err(anyhow!("OTP_CLEANUP_INTERVAL_SECS must be greater than 0"));
        }

        let config = Self {
            port: parse_or(get("PORT"), "PORT", DEFAULT_PORT)?,
            mongodb_uri: required("MONGODB_URI")?,
            mongodb_min_pool: parse_or(
                get("MONGODB_MIN_POOL_SIZE"),
                "MONGODB_MIN_POOL_SIZE",
                MONGO_MIN_POOL_SIZE,
            )?,
            mongodb_max_pool: parse_or(
                get("MONGODB_MAX_POOL_SIZE"),
                "MONGODB_MAX_POOL_SIZE",
                MONGO_MAX_POOL_SIZE,
            )?,
            db_name: get("MONGODB_DB_NAME").unwrap_or(DB_NAME.into()),
            otp_ttl_secs,
            otp_length,
            country_prefix,
            api_key: required("VERIFY_API_KEY")?,
            sms,
            sms_dry_run,
            cleanup_interval_secs,
        };
        Ok(config)
    }
}

fn parse_or<T>(val: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match val {
        Some(val) => val
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value for {key}: {val}")),
        None => Ok(default),
    }
}
