use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{app::AppState, constants::API_KEY_HEADER, utils::AppError};

/// Middleware rejecting requests without the configured `X-API-Key` header
pub async fn require_api_key<B>(
    State(state): State<AppState>,
    req: Request<B>,
    next: Next<B>,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|val| val.to_str().ok());
    match provided {
        Some(key) if key == state.config.api_key => Ok(next.run(req).await),
        _ => {
            let msg = "Invalid API Key or missing X-API-Key header.".to_owned();
            Err(AppError::Auth(msg))
        }
    }
}
