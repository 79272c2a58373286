use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::GenericResponse;

#[derive(Debug)]
pub enum AppError {
    BadRequestErr(String),
    NotFound(String),
    Auth(String),
    Conflict(String),
    Unavailable(String),
    AnyError(anyhow::Error),
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self::AnyError(err.into())
    }
}

fn error_response(status: StatusCode, msg: String) -> Response {
    let response = GenericResponse {
        success: false,
        message: msg,
    };
    (status, Json(response)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequestErr(msg) => {
                tracing::debug!("Bad request: {}", msg);
                error_response(StatusCode::BAD_REQUEST, msg)
            }
            Self::NotFound(msg) => {
                tracing::debug!("Not Found: {}", msg);
                error_response(StatusCode::NOT_FOUND, msg)
            }
            Self::Auth(msg) => {
                tracing::debug!("Unauthorized: {}", msg);
                error_response(StatusCode::UNAUTHORIZED, msg)
            }
            Self::Conflict(msg) => {
                tracing::debug!("Conflict: {}", msg);
                error_response(StatusCode::CONFLICT, msg)
            }
            Self::Unavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                error_response(StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            Self::AnyError(err) => {
                tracing::error!("Something went wrong: {err:?}");
                let msg = format!("Something went wrong: {err}");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        }
    }
}
