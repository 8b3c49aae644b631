use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::{debug, error};

use super::body::RecordBody;
use super::clock::Clock;
use super::domain::{CollectionKind, Record};
use super::repository::RecordRepository;
use super::service::{RecordService, RecordServiceError};
use crate::error::{internal_error_response, ENDPOINT_NOT_FOUND_MESSAGE};

/// Per-collection handler state: the shared service plus the collection the
/// route was mounted for.
pub(crate) struct CollectionHandle<R, C> {
    service: Arc<RecordService<R, C>>,
    kind: CollectionKind,
}

impl<R, C> Clone for CollectionHandle<R, C> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            kind: self.kind,
        }
    }
}

/// Router builder exposing the companies, drafts and submissions endpoints.
pub fn record_router<R, C>(service: Arc<RecordService<R, C>>) -> Router
where
    R: RecordRepository + 'static,
    C: Clock + 'static,
{
    CollectionKind::ALL
        .into_iter()
        .fold(Router::new(), |router, kind| {
            router.merge(collection_router(Arc::clone(&service), kind))
        })
}

fn collection_router<R, C>(service: Arc<RecordService<R, C>>, kind: CollectionKind) -> Router
where
    R: RecordRepository + 'static,
    C: Clock + 'static,
{
    let item_path = format!("{}/{{id}}", kind.path());
    let router = Router::new().route(
        kind.path(),
        get(list_handler::<R, C>).post(create_handler::<R, C>),
    );

    let router = match (kind.supports_lookup(), kind.is_mutable()) {
        (true, true) => router.route(
            &item_path,
            get(fetch_handler::<R, C>)
                .put(update_handler::<R, C>)
                .delete(delete_handler::<R, C>),
        ),
        (true, false) => router.route(&item_path, get(fetch_handler::<R, C>)),
        (false, _) => router,
    };

    router.with_state(CollectionHandle { service, kind })
}

pub(crate) async fn list_handler<R, C>(
    State(handle): State<CollectionHandle<R, C>>,
) -> Result<Json<Vec<Record>>, RecordServiceError>
where
    R: RecordRepository + 'static,
    C: Clock + 'static,
{
    handle.service.list(handle.kind).map(Json)
}

pub(crate) async fn create_handler<R, C>(
    State(handle): State<CollectionHandle<R, C>>,
    RecordBody(body): RecordBody,
) -> Result<(StatusCode, Json<Record>), RecordServiceError>
where
    R: RecordRepository + 'static,
    C: Clock + 'static,
{
    let record = handle.service.create(handle.kind, body)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub(crate) async fn fetch_handler<R, C>(
    State(handle): State<CollectionHandle<R, C>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Record>, RecordServiceError>
where
    R: RecordRepository + 'static,
    C: Clock + 'static,
{
    let id = path_id(handle.kind, id)?;
    handle.service.get(handle.kind, &id).map(Json)
}

pub(crate) async fn update_handler<R, C>(
    State(handle): State<CollectionHandle<R, C>>,
    id: Result<Path<String>, PathRejection>,
    RecordBody(body): RecordBody,
) -> Result<Json<Record>, RecordServiceError>
where
    R: RecordRepository + 'static,
    C: Clock + 'static,
{
    let id = path_id(handle.kind, id)?;
    handle.service.update(handle.kind, &id, body).map(Json)
}

pub(crate) async fn delete_handler<R, C>(
    State(handle): State<CollectionHandle<R, C>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, RecordServiceError>
where
    R: RecordRepository + 'static,
    C: Clock + 'static,
{
    let id = path_id(handle.kind, id)?;
    handle.service.delete(handle.kind, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ids that do not percent-decode to UTF-8 are treated as unknown ids.
fn path_id(
    kind: CollectionKind,
    id: Result<Path<String>, PathRejection>,
) -> Result<String, RecordServiceError> {
    id.map(|Path(id)| id).map_err(|rejection| {
        debug!(collection = kind.key(), error = %rejection, "undecodable record id");
        RecordServiceError::NotFound(kind)
    })
}

impl IntoResponse for RecordServiceError {
    fn into_response(self) -> Response {
        match self {
            RecordServiceError::NotFound(kind) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": kind.not_found_message() })),
            )
                .into_response(),
            RecordServiceError::Immutable(kind) => {
                error!(collection = kind.key(), "mutation routed to immutable collection");
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": ENDPOINT_NOT_FOUND_MESSAGE })),
                )
                    .into_response()
            }
            RecordServiceError::Repository(err) => {
                error!(error = %err, "record repository failure");
                internal_error_response()
            }
        }
    }
}
