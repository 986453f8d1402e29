//! Request extraction
//!
//! Request bodies are decoded with case-insensitive field names: every
//! object key is lowercased before deserialization, so `ClassId`,
//! `classId` and `CLASSID` all land in a field named `classid`.
//!
//! Both extractors reject with [`RosterError`], so every failure carries
//! the `{error, code}` JSON body.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::roster::{RosterError, RosterResult};

/// JSON body extractor that ignores the case of field names
#[derive(Debug, Clone)]
pub struct CaseInsensitiveJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for CaseInsensitiveJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RosterError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json_content_type(req.headers()) {
            return Err(RosterError::UnsupportedMediaType(
                "expected Content-Type: application/json".to_string(),
            ));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| RosterError::Validation(format!("unreadable body: {e}")))?;
        decode(&bytes).map(Self)
    }
}

/// Path parameters; malformed or out-of-range values are a 400
#[derive(Debug, Clone)]
pub struct RosterPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for RosterPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = RosterError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|e| RosterError::Validation(format!("invalid path: {}", e.body_text())))
    }
}

/// `application/json`, or any `application/*+json`, parameters ignored
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

/// Decode a JSON document into `T`, matching field names case-insensitively
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> RosterResult<T> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| RosterError::Validation(format!("malformed JSON body: {e}")))?;
    serde_json::from_value(fold_keys(value))
        .map_err(|e| RosterError::Validation(format!("unexpected body shape: {e}")))
}

fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_lowercase(), fold_keys(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}
