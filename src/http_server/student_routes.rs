//! Student HTTP Routes
//!
//! CRUD endpoints for `/students`. Handlers only translate between HTTP
//! and [`StudentsHandler`]; all rules live there.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::roster::{RosterResult, StudentPayload, StudentRecord};

use super::extract::{CaseInsensitiveJson, RosterPath};
use super::server::AppState;

/// Create student routes
pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/students",
            get(list_students_handler).post(create_student_handler),
        )
        .route(
            "/students/:id",
            get(get_student_handler)
                .put(update_student_handler)
                .delete(delete_student_handler),
        )
}

/// Location of a student resource
pub fn student_location(id: i32) -> String {
    format!("/students/{id}")
}

async fn list_students_handler(
    State(state): State<AppState>,
) -> RosterResult<Json<Vec<StudentRecord>>> {
    Ok(Json(state.students.list().await?))
}

async fn get_student_handler(
    State(state): State<AppState>,
    RosterPath(id): RosterPath<i32>,
) -> RosterResult<Json<StudentRecord>> {
    Ok(Json(state.students.get(id).await?))
}

async fn create_student_handler(
    State(state): State<AppState>,
    CaseInsensitiveJson(payload): CaseInsensitiveJson<StudentPayload>,
) -> RosterResult<impl IntoResponse> {
    let record = state.students.create(payload).await?;
    let location = student_location(record.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(record),
    ))
}

async fn update_student_handler(
    State(state): State<AppState>,
    RosterPath(id): RosterPath<i32>,
    CaseInsensitiveJson(payload): CaseInsensitiveJson<StudentPayload>,
) -> RosterResult<StatusCode> {
    state.students.update(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_student_handler(
    State(state): State<AppState>,
    RosterPath(id): RosterPath<i32>,
) -> RosterResult<Json<StudentRecord>> {
    Ok(Json(state.students.delete(id).await?))
}
