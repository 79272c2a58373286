use axum::{http::Uri, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{models::GenericResponse, utils::AppError};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PingResponse {
    pub success: bool,
    pub service: String,
    pub version: String,
}

/// Ping endpoint
///
/// Health check returning the service name and version
#[utoipa::path(
    get,
    path = "/api/v1/ping",
    responses(
        (status = 200, description = "Service is up", body = PingResponse)
    ),
    tag = "Debugging API"
)]
pub async fn ping_handler() -> Json<PingResponse> {
    let res = PingResponse {
        success: true,
        service: env!("CARGO_PKG_NAME").to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    };
    Json(res)
}

/// Handler function for default route "/"
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Server is running", body = GenericResponse)
    ),
    tag = "Debugging API"
)]
pub async fn default_route_handler() -> Json<GenericResponse> {
    let res = GenericResponse {
        success: true,
        message: "Server is running".to_owned(),
    };
    Json(res)
}

pub async fn global_404_handler(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route `{}` does not exist", uri))
}
