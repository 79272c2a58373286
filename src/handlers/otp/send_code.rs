use axum::{extract::State, Json};

use crate::{
    app::AppState,
    models::{GenericResponse, SendCodeReq},
    utils::{generate_otp, mask_phone, normalize_phone, AppError, ValidatedBody},
};

/// Send a verification code
///
/// Issue a new code for the phone number, replacing any unused code sent
/// before, and deliver it by SMS
#[utoipa::path(
    post,
    path = "/api/v1/otp/send",
    request_body = SendCodeReq,
    responses(
        (status = 200, description = "Verification code sent", body = GenericResponse),
        (status = 400, description = "Invalid request body", body = GenericResponse),
        (status = 401, description = "Invalid API key", body = GenericResponse),
        (status = 503, description = "Code could not be stored, retry", body = GenericResponse),
        (status = 500, description = "SMS could not be sent", body = GenericResponse),
    ),
    tag = "Verification API",
    security(
        ("api_key" = [])
    ),
)]
pub async fn send_code_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<SendCodeReq>,
) -> Result<Json<GenericResponse>, AppError> {
    let phone = normalize_phone(&body.phone_number, &state.config.country_prefix);
    let otp = generate_otp(state.config.otp_length);
    let outcome = state.otp.issue(&phone, &otp).await;
    if !outcome.is_stored() {
        let msg = "Unable to issue verification code, please retry".to_owned();
        return Err(AppError::Unavailable(msg));
    }
    state.sms.send(&phone, &otp).await.map_err(|err| {
        tracing::error!("Unable to send otp sms to {}: {err:?}", mask_phone(&phone));
        AppError::AnyError(err.context("Failed to send verification code"))
    })?;
    let res = GenericResponse {
        success: true,
        message: "Verification code sent".to_owned(),
    };
    Ok(Json(res))
}
