use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;
use serde_json::Value;
use tracing::{debug, error};

use super::domain::Fields;
use super::form::parse_form;
use crate::error::internal_error_response;

/// Request body as a field map.
///
/// JSON objects and URL-encoded forms (with nested bracket keys) are accepted. Anything else (no content
/// type, an unknown one, malformed JSON, a JSON value that is not an object)
/// yields an empty map rather than a rejection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBody(pub Fields);

impl<S> FromRequest<S> for RecordBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            error!(error = %rejection, "failed to read request body");
            internal_error_response()
        })?;

        Ok(Self(parse_fields(content_type.as_deref(), &bytes)))
    }
}

/// Decode `body` according to its `Content-Type` header value.
pub fn parse_fields(content_type: Option<&str>, body: &[u8]) -> Fields {
    let Some(mime) = content_type.map(essence) else {
        return Fields::new();
    };
    if body.is_empty() {
        return Fields::new();
    }

    if is_json(&mime) {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                debug!(kind = json_kind(&other), "ignoring non-object JSON body");
                Fields::new()
            }
            Err(err) => {
                debug!(error = %err, "ignoring malformed JSON body");
                Fields::new()
            }
        }
    } else if mime == "application/x-www-form-urlencoded" {
        parse_form(body)
    } else {
        debug!(content_type = %mime, "ignoring body with unsupported content type");
        Fields::new()
    }
}

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_json(mime: &str) -> bool {
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
