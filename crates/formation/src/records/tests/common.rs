use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use crate::records::domain::{CollectionKind, Fields, Record, RecordId};
use crate::records::repository::{RecordRepository, RepositoryError};
use crate::records::{record_router, InMemoryRecordRepository, RecordService};

pub(super) fn build_service() -> (
    Arc<RecordService<InMemoryRecordRepository>>,
    Arc<InMemoryRecordRepository>,
) {
    let repository = Arc::new(InMemoryRecordRepository::default());
    let service = Arc::new(RecordService::new(repository.clone()));
    (service, repository)
}

pub(super) fn router() -> Router {
    let (service, _) = build_service();
    record_router(service)
}

pub(super) fn fields(value: Value) -> Fields {
    match value {
        Value::Object(fields) => fields,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub(super) fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serializable body")))
        .expect("valid request")
}

pub(super) fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    }
}

pub(super) async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("route executes");
    let status = response.status();
    (status, read_json_body(response).await)
}

/// Repository whose every operation fails, to exercise the opaque 500 path.
pub(super) struct UnavailableRepository;

impl RecordRepository for UnavailableRepository {
    fn list(&self, _kind: CollectionKind) -> Result<Vec<Record>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn append(&self, _kind: CollectionKind, _record: Record) -> Result<Record, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn find(
        &self,
        _kind: CollectionKind,
        _id: RecordId,
    ) -> Result<Option<Record>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn modify(
        &self,
        _kind: CollectionKind,
        _id: RecordId,
        _change: &mut dyn FnMut(&mut Record),
    ) -> Result<Option<Record>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn remove(
        &self,
        kind: CollectionKind,
        _id: RecordId,
    ) -> Result<Option<Record>, RepositoryError> {
        Err(RepositoryError::Poisoned(kind))
    }
}
