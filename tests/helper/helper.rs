use async_trait::async_trait;
use axum::{body::Body, http::Request};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use phone_verify_backend::{
    app::AppState,
    config::AppConfig,
    constants::*,
    models::{CreateUserOutcome, NewUser, User},
    otp::{MemoryOtpStore, OtpManager},
    sms::SmsSender,
    users::UserStore,
};

pub const API_KEY: &str = "integration-api-key";

/// Keeps the last code sent to every phone so tests can read it back
#[derive(Default)]
pub struct RecordingSmsSender {
    sent: Mutex<HashMap<String, String>>,
}

impl RecordingSmsSender {
    pub fn last_code(&self, phone: &str) -> Option<String> {
        self.sent.lock().unwrap().get(phone).cloned()
    }
}

#[async_trait]
impl SmsSender for RecordingSmsSender {
    async fn send(&self, recipient: &str, code: &str) -> anyhow::Result<()> {
        let mut sent = self.sent.lock().unwrap();
        sent.insert(recipient.to_owned(), code.to_owned());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, user: NewUser) -> CreateUserOutcome {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.phone_number == user.phone_number) {
            return CreateUserOutcome::AlreadyExists;
        }
        let id = ObjectId::new();
        users.push(User {
            id: Some(id),
            name: user.name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            created_at: BsonDateTime::now(),
        });
        CreateUserOutcome::Created(id.to_hex())
    }

    async fn find_by_phone(&self, phone_number: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        let found = users.iter().find(|u| u.phone_number == phone_number).cloned();
        Ok(found)
    }
}

pub fn build_state(sms: Arc<RecordingSmsSender>) -> AppState {
    let config = AppConfig {
        port: DEFAULT_PORT,
        mongodb_uri: "mongodb://localhost:27017".into(),
        mongodb_min_pool: MONGO_MIN_POOL_SIZE,
        mongodb_max_pool: MONGO_MAX_POOL_SIZE,
        db_name: DB_NAME.into(),
        otp_ttl_secs: OTP_EXPIRY_SECS,
        otp_length: OTP_LENGTH,
        country_prefix: DEFAULT_COUNTRY_PREFIX.into(),
        api_key: API_KEY.into(),
        sms: None,
        sms_dry_run: true,
        cleanup_interval_secs: OTP_CLEANUP_JOB_INTERVAL,
    };
    let otp = OtpManager::new(Arc::new(MemoryOtpStore::new()), config.otp_ttl_secs);
    AppState {
        config: Arc::new(config),
        otp: Arc::new(otp),
        users: Arc::new(MemoryUserStore::default()),
        sms,
    }
}

pub fn build_post_request(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .method("POST")
        .header("Content-Type", "application/json")
        .header(API_KEY_HEADER, API_KEY)
        .body(Body::from(body.to_owned()))
        .unwrap()
}

pub fn build_get_request(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(API_KEY_HEADER, API_KEY)
        .body(Body::empty())
        .unwrap()
}
