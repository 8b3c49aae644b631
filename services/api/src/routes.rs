use crate::infra::{AppState, RecordStore};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{SecondsFormat, Utc};
use formation::error::{internal_error_response, ENDPOINT_NOT_FOUND_MESSAGE};
use formation::records::{record_router, CollectionKind};
use serde::Serialize;
use serde_json::json;
use std::any::Any;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, Span};

pub(crate) const INFO_MESSAGE: &str = "BVI Company Formation API is running!";

#[derive(Debug, Serialize)]
pub(crate) struct ServiceInfo {
    pub(crate) message: &'static str,
    pub(crate) timestamp: String,
    pub(crate) endpoints: EndpointMap,
}

#[derive(Debug, Serialize)]
pub(crate) struct EndpointMap {
    pub(crate) companies: &'static str,
    pub(crate) drafts: &'static str,
    pub(crate) submissions: &'static str,
}

pub(crate) fn with_service_routes(store: Arc<RecordStore>) -> Router {
    record_router(store)
        .route("/", get(info_endpoint))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn info_endpoint() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: INFO_MESSAGE,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        endpoints: EndpointMap {
            companies: CollectionKind::Companies.path(),
            drafts: CollectionKind::Drafts.path(),
            submissions: CollectionKind::Submissions.path(),
        },
    })
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn endpoint_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": ENDPOINT_NOT_FOUND_MESSAGE })),
    )
        .into_response()
}

/// Converts a handler panic into the opaque 500, logging the payload.
pub(crate) fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic payload"
    };

    error!(panic = detail, "request handler panicked");
    internal_error_response()
}

/// Request span carrying the id assigned by the request-id layer.
pub(crate) fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
