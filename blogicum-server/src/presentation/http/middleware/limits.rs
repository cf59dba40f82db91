use std::time::Duration;

use axum::{
    Json, Router,
    error_handling::HandleErrorLayer,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower::{
    BoxError, ServiceBuilder, limit::GlobalConcurrencyLimitLayer, timeout::TimeoutLayer,
    timeout::error::Elapsed,
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub(crate) struct HttpLimits {
    pub(crate) body_limit_bytes: usize,
    pub(crate) concurrency_limit: usize,
    pub(crate) request_timeout: Duration,
}

pub(crate) fn apply_limits(router: Router, limits: HttpLimits) -> Router {
    router
        .layer(RequestBodyLimitLayer::new(limits.body_limit_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(GlobalConcurrencyLimitLayer::new(limits.concurrency_limit))
                .layer(TimeoutLayer::new(limits.request_timeout)),
        )
}

async fn handle_middleware_error(err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        warn!("request timed out");
        return (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "request timed out" })),
        )
            .into_response();
    }

    warn!(error = %err, "request rejected by middleware");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": "service unavailable" })),
    )
        .into_response()
}
