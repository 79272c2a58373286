use axum::{extract::State, http::StatusCode, Json};

use crate::{
    app::AppState,
    models::{CreateUserOutcome, CreateUserReq, CreateUserResponse, GenericResponse, NewUser},
    utils::{normalize_phone, AppError, ValidatedBody},
};

/// Register user
///
/// Create a user profile for a phone number. The phone is normalized before
/// it is stored, so one phone maps to at most one user.
#[utoipa::path(
    post,
    path = "/api/v1/user/create",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "User registered", body = CreateUserResponse),
        (status = 400, description = "Invalid request body", body = GenericResponse),
        (status = 401, description = "Invalid API key", body = GenericResponse),
        (status = 409, description = "User already exists", body = GenericResponse),
    ),
    tag = "User API",
    security(
        ("api_key" = [])
    ),
)]
pub async fn create_user_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<CreateUserReq>,
) -> Result<(StatusCode, Json<CreateUserResponse>), AppError> {
    let phone_number = normalize_phone(&body.phone_number, &state.config.country_prefix);
    let new_user = NewUser {
        name: body.name.trim().to_owned(),
        last_name: body.last_name.trim().to_owned(),
        phone_number: phone_number.to_owned(),
    };
    match state.users.create_user(new_user).await {
        CreateUserOutcome::Created(user_id) => {
            let res = CreateUserResponse {
                success: true,
                message: "User registered successfully.".to_owned(),
                user_id,
            };
            Ok((StatusCode::CREATED, Json(res)))
        }
        CreateUserOutcome::AlreadyExists => {
            let msg = format!("User already exists with phone: {phone_number}");
            Err(AppError::Conflict(msg))
        }
        CreateUserOutcome::Failed(reason) => Err(AppError::AnyError(anyhow::anyhow!(reason))),
    }
}
