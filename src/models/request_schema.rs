use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::utils::{validate_otp_code, validate_phone_input};

/// request body schema for sending a verification code
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendCodeReq {
    #[validate(length(min = 1, max = 32), custom(function = "validate_phone_input"))]
    pub phone_number: String,
}

/// request body schema for verifying a code
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeReq {
    #[validate(length(min = 1, max = 32), custom(function = "validate_phone_input"))]
    pub phone_number: String,

    #[validate(length(min = 4, max = 6), custom(function = "validate_otp_code"))]
    pub otp_code: String,
}

/// request body schema for create user
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReq {
    #[validate(length(min = 1, max = 50))]
    pub name: String,

    #[validate(length(min = 1, max = 50))]
    pub last_name: String,

    #[validate(length(min = 1, max = 32), custom(function = "validate_phone_input"))]
    pub phone_number: String,
}

/// query params for fetching a user by phone
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GetUserQuery {
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
}
