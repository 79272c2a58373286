use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    middleware,
    routing::{get, post},
    BoxError, Json, Router,
};
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_api_key,
    config::AppConfig,
    constants::REQUEST_TIMEOUT_SECS,
    handlers::*,
    models::GenericResponse,
    otp::OtpManager,
    sms::SmsSender,
    swagger::ApiDoc,
    users::UserStore,
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub otp: Arc<OtpManager>,
    pub users: Arc<dyn UserStore>,
    pub sms: Arc<dyn SmsSender>,
}

pub fn build_app(state: AppState) -> Router {
    tracing::debug!("Initializing the app");
    let protected = Router::new()
        .route("/otp/send", post(send_code_handler))
        .route("/otp/verify", post(verify_code_handler))
        .route("/user/create", post(create_user_handler))
        .route("/user", get(get_user_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    let api = Router::new()
        .route("/ping", get(ping_handler))
        .merge(protected);

    let swagger = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());

    Router::new()
        .route("/", get(default_route_handler))
        .nest("/api/v1", api)
        .merge(swagger)
        .fallback(global_404_handler)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_timeout_error(err: BoxError) -> (StatusCode, Json<GenericResponse>) {
    let (status, message) = if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_owned())
    } else {
        let msg = format!("Unhandled internal error: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, msg)
    };
    tracing::error!("{message}");
    let res = GenericResponse {
        success: false,
        message,
    };
    (status, Json(res))
}
