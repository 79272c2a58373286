use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::constants::API_KEY_HEADER;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::status::ping_handler,
        crate::handlers::status::default_route_handler,
        crate::handlers::otp::send_code::send_code_handler,
        crate::handlers::otp::verify_code::verify_code_handler,
        crate::handlers::user::create::create_user_handler,
        crate::handlers::user::get::get_user_handler,
    ),
    components(
        schemas(
            crate::models::SendCodeReq,
            crate::models::VerifyCodeReq,
            crate::models::CreateUserReq,

            crate::models::GenericResponse,
            crate::models::CreateUserResponse,
            crate::models::UserResponse,
            crate::handlers::status::PingResponse,

            crate::models::UserData,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Debugging API", description = "API for debugging purposes"),
        (name = "Verification API", description = "API for sending and verifying phone codes"),
        (name = "User API", description = "API for registering and fetching users")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
            )
        }
    }
}
