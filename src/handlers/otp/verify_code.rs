use axum::{extract::State, Json};

use crate::{
    app::AppState,
    models::{GenericResponse, VerifyCodeReq},
    utils::{normalize_phone, AppError, ValidatedBody},
};

/// Verify a code
///
/// Consumes the code when it matches the last code sent to the phone and has
/// not expired. A code can be verified only once.
#[utoipa::path(
    post,
    path = "/api/v1/otp/verify",
    request_body = VerifyCodeReq,
    responses(
        (status = 200, description = "Phone number verified", body = GenericResponse),
        (status = 400, description = "Invalid or expired verification code", body = GenericResponse),
        (status = 401, description = "Invalid API key", body = GenericResponse),
    ),
    tag = "Verification API",
    security(
        ("api_key" = [])
    ),
)]
pub async fn verify_code_handler(
    State(state): State<AppState>,
    ValidatedBody(body): ValidatedBody<VerifyCodeReq>,
) -> Result<Json<GenericResponse>, AppError> {
    let phone = normalize_phone(&body.phone_number, &state.config.country_prefix);
    if !state.otp.verify(&phone, &body.otp_code).await {
        let msg = "Invalid or expired verification code".to_owned();
        return Err(AppError::BadRequestErr(msg));
    }
    let res = GenericResponse {
        success: true,
        message: "Phone number verified".to_owned(),
    };
    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, routing::post, Router};
    use tower::ServiceExt; // for `oneshot` and `ready`

    use super::*;
    use crate::app::tests::{json_request, test_state};

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/verify", post(verify_code_handler))
            .with_state(state)
    }

    async fn call(state: &AppState, body: &str) -> (StatusCode, GenericResponse) {
        let res = app(state.clone())
            .oneshot(json_request("/verify", body))
            .await
            .unwrap();
        let status = res.status();
        let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
        let body: GenericResponse = serde_json::from_slice(&body).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_verify_code_once() {
        let state = test_state();
        assert!(state.otp.issue("+989123456789", "482913").await.is_stored());

        // a differently formatted number maps to the same key
        let body = r#"{"phoneNumber": "00989123456789", "otpCode": "482913"}"#;
        let (status, res) = call(&state, body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(res.success, true);

        let (status, res) = call(&state, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res.success, false);
        assert_eq!(res.message, "Invalid or expired verification code");
    }

    #[tokio::test]
    async fn test_verify_wrong_and_unknown_look_the_same() {
        let state = test_state();
        state.otp.issue("+989123456789", "482913").await;
        let wrong = r#"{"phoneNumber": "09123456789", "otpCode": "111111"}"#;
        let unknown = r#"{"phoneNumber": "+15551234567", "otpCode": "482913"}"#;
        let (wrong_status, wrong_res) = call(&state, wrong).await;
        let (unknown_status, unknown_res) = call(&state, unknown).await;
        assert_eq!(wrong_status, unknown_status);
        assert_eq!(wrong_res.message, unknown_res.message);
    }

    #[tokio::test]
    async fn test_verify_code_validation() {
        let state = test_state();
        let cases = [
            r#"{"phoneNumber": "09123456789", "otpCode": "123"}"#,
            r#"{"phoneNumber": "09123456789", "otpCode": "1234567"}"#,
            r#"{"phoneNumber": "09123456789", "otpCode": "12a456"}"#,
            r#"{"phoneNumber": "09123456789"}"#,
        ];
        for body in cases {
            let (status, res) = call(&state, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(res.success, false);
        }
    }
}
