use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::{
    app::AppState,
    models::{GenericResponse, GetUserQuery, UserResponse},
    utils::{normalize_phone, AppError},
};

/// Get user by phone
#[utoipa::path(
    get,
    path = "/api/v1/user",
    params(GetUserQuery),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Invalid API key", body = GenericResponse),
        (status = 404, description = "User not found", body = GenericResponse),
    ),
    tag = "User API",
    security(
        ("api_key" = [])
    ),
)]
pub async fn get_user_handler(
    State(state): State<AppState>,
    params: Query<GetUserQuery>,
) -> Result<Json<UserResponse>, AppError> {
    params
        .validate()
        .map_err(|err| AppError::BadRequestErr(err.to_string()))?;
    let phone = normalize_phone(&params.phone, &state.config.country_prefix);
    let not_found = AppError::NotFound(format!("User not found with phone: {phone}"));
    let user = state.users.find_by_phone(&phone).await?.ok_or(not_found)?;
    let res = UserResponse {
        success: true,
        data: user.into(),
    };
    Ok(Json(res))
}
