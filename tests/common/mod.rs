//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use roster::http_server::{build_router, AppState, HttpServerConfig};
use roster::storage::{MemoryStore, RosterSeed, RosterStore};

/// One school, one teacher, one class, two students
pub const FIXTURE: &str = r#"{
    "schools":  [{ "id": 1, "name": "School of Hard Knocks", "city": "Springfield", "state": "IL" }],
    "teachers": [{ "id": 1, "name": "Mrs. Stricter", "schoolId": 1 }],
    "classes":  [{ "id": 1, "name": "Fifth Grade Class", "teacherId": 1 }],
    "students": [
        { "id": 1, "name": "Jim Bob", "classId": 1 },
        { "id": 2, "name": "Jane Doe", "classId": 1 }
    ]
}"#;

/// Second branch of the hierarchy: school 2 → teacher 2 → class 2, no students
pub const SECOND_BRANCH: &str = r#"{
    "schools":  [{ "id": 2, "name": "Westside Academy", "city": "Shelbyville", "state": "IL" }],
    "teachers": [{ "id": 2, "name": "Mr. Hoover", "schoolId": 2 }],
    "classes":  [{ "id": 2, "name": "Sixth Grade Class", "teacherId": 2 }]
}"#;

pub async fn seed(store: &dyn RosterStore, document: &str) {
    RosterSeed::from_json(document)
        .unwrap()
        .apply(store)
        .await
        .unwrap();
}

/// In-memory store loaded with [`FIXTURE`]
pub async fn seeded_store() -> Arc<dyn RosterStore> {
    let store: Arc<dyn RosterStore> = MemoryStore::new_shared();
    seed(store.as_ref(), FIXTURE).await;
    store
}

pub fn app(store: Arc<dyn RosterStore>) -> Router {
    build_router(&HttpServerConfig::default(), AppState::new(store))
}

/// Response status, headers and decoded JSON body (`Null` when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None).await
}
