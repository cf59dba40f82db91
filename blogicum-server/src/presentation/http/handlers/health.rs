use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::presentation::http::app_error::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthzResponse {
    status: &'static str,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = HealthzResponse)
    )
)]
pub(crate) async fn healthz() -> Json<HealthzResponse> {
    Json(HealthzResponse { status: "ok" })
}

pub(crate) async fn not_found() -> AppError {
    AppError::NotFound
}
