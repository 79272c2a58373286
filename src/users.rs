use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};
use std::sync::Arc;

use crate::{
    constants::*,
    models::{CreateUserOutcome, NewUser, User},
    utils::{mask_phone, to_bson_datetime},
};

#[cfg(not(test))]
use crate::database::AppDatabase;
#[cfg(test)]
use crate::database::MockAppDatabase as AppDatabase;

#[cfg(test)]
use mockall::automock;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Registered user profiles keyed by canonical phone number
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> CreateUserOutcome;

    async fn find_by_phone(&self, phone_number: &str) -> anyhow::Result<Option<User>>;
}

pub struct MongoUserStore {
    db: Arc<AppDatabase>,
}

impl MongoUserStore {
    pub fn new(db: Arc<AppDatabase>) -> Self {
        Self { db }
    }

    pub async fn ensure_indexes(&self) -> anyhow::Result<()> {
        let options = IndexOptions::builder()
            .name("phoneNumber_unique".to_owned())
            .unique(true)
            .build();
        self.db
            .create_index(COLL_USERS, doc! {"phoneNumber": 1}, options)
            .await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> mongodb::error::Result<CreateUserOutcome> {
        let filter = Some(doc! {"phoneNumber": &user.phone_number});
        let existing = self
            .db
            .find_one::<User>(COLL_USERS, filter, None)
            .await?;
        if existing.is_some() {
            tracing::info!("User with phone number {} already exists", mask_phone(&user.phone_number));
            return Ok(CreateUserOutcome::AlreadyExists);
        }
        let doc = User {
            id: None,
            name: user.name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            created_at: to_bson_datetime(Utc::now()),
        };
        let inserted_id = self.db.insert_one(COLL_USERS, &doc, None).await?;
        let id = match inserted_id.as_object_id() {
            Some(oid) => oid.to_hex(),
            None => inserted_id.to_string(),
        };
        tracing::info!("User created with id: {id}");
        Ok(CreateUserOutcome::Created(id))
    }
}

pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => {
            write_err.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

/// Reject profiles without a name, last name or phone number
pub(crate) fn check_new_user(user: &NewUser) -> Result<(), String> {
    let missing: Vec<&str> = [
        ("name", &user.name),
        ("lastName", &user.last_name),
        ("phoneNumber", &user.phone_number),
    ]
    .into_iter()
    .filter(|(_, val)| val.trim().is_empty())
    .map(|(field, _)| field)
    .collect();
    if !missing.is_empty() {
        return Err(format!("Missing user fields: {}", missing.join(", ")));
    }
    Ok(())
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn create_user(&self, user: NewUser) -> CreateUserOutcome {
        if let Err(reason) = check_new_user(&user) {
            tracing::warn!("{reason}");
            return CreateUserOutcome::Failed(reason);
        }
        match self.insert_user(user).await {
            Ok(outcome) => outcome,
            // lost a race with another insert for the same phone
            Err(err) if is_duplicate_key(&err) => CreateUserOutcome::AlreadyExists,
            Err(err) => {
                tracing::error!("MongoDB error while creating user: {err:?}");
                CreateUserOutcome::Failed(err.to_string())
            }
        }
    }

    async fn find_by_phone(&self, phone_number: &str) -> anyhow::Result<Option<User>> {
        let filter = Some(doc! {"phoneNumber": phone_number});
        let user = self
            .db
            .find_one::<User>(COLL_USERS, filter, None)
            .await?;
        Ok(user)
    }
}
