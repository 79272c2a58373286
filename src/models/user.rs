use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registered user profile as stored in the users collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub last_name: String,
    pub phone_number: String,
    pub created_at: BsonDateTime,
}

/// Fields required to register a user, `phone_number` already normalized
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub last_name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateUserOutcome {
    Created(String),
    AlreadyExists,
    Failed(String),
}

/// User data returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: String,
    pub name: String,
    pub last_name: String,
    pub phone_number: String,
    pub created_at: String,
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: user.name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            created_at: user.created_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}
