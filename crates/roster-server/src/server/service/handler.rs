//! Boundary adapters for the student CRUD operations.
//!
//! Each handler builds exactly one repository call, dispatches it to the
//! worker pool, and races the returned reply slot against the request
//! deadline. The store call carries its own, strictly shorter deadline, so a
//! slow query cannot occupy a worker long past the point its client gave
//! up. A deadline expiry surfaces as 504, distinguishable from a store
//! failure; an admission failure during shutdown surfaces as 503.

use core::future::Future;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use roster_core::dispatch::Outcome;
use roster_core::{Error, Student, StudentDraft, StudentId};
use serde::Serialize;

use super::AppState;

/// Payload for `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Dispatches `work` to the pool and waits for its outcome under the
/// request deadline.
async fn run_on_pool<T, W>(state: &AppState, work: W) -> Result<T, Error>
where
    T: Send + 'static,
    W: Future<Output = Result<T, Error>> + Send + 'static,
{
    let slot = state.pool.dispatch(work).await?;
    match slot.await_within(state.config.request_timeout).await {
        Outcome::Completed(result) => result,
        Outcome::TimedOut => Err(Error::DeadlineExceeded),
    }
}

pub async fn create_student(
    State(state): State<AppState>,
    body: Result<Json<StudentDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), Error> {
    let Json(draft) = body.map_err(|e| Error::InvalidRequest {
        reason: e.body_text(),
    })?;
    tracing::info!(email = %draft.email, "Creating student");

    let repo = Arc::clone(&state.repo);
    let deadline = state.config.store_timeout;
    let student = run_on_pool(&state, async move { repo.create(draft, deadline).await }).await?;

    tracing::info!(id = student.id, "Student created");
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, Error> {
    tracing::info!("Fetching all students");

    let repo = Arc::clone(&state.repo);
    let deadline = state.config.store_timeout;
    let students = run_on_pool(&state, async move { repo.get_all(deadline).await }).await?;

    tracing::info!(count = students.len(), "Students fetched");
    Ok(Json(students))
}

pub async fn get_student(
    State(state): State<AppState>,
    id: Result<Path<StudentId>, PathRejection>,
) -> Result<Json<Student>, Error> {
    let Path(id) = id.map_err(|_| Error::InvalidRequest {
        reason: "invalid student id".into(),
    })?;
    tracing::info!(id, "Fetching student");

    let repo = Arc::clone(&state.repo);
    let deadline = state.config.store_timeout;
    let student = run_on_pool(&state, async move { repo.get(id, deadline).await })
        .await?
        .ok_or(Error::NotFound)?;

    Ok(Json(student))
}

pub async fn update_student(
    State(state): State<AppState>,
    id: Result<Path<StudentId>, PathRejection>,
    body: Result<Json<StudentDraft>, JsonRejection>,
) -> Result<Json<Student>, Error> {
    let Path(id) = id.map_err(|_| Error::InvalidRequest {
        reason: "invalid student id".into(),
    })?;
    let Json(draft) = body.map_err(|e| Error::InvalidRequest {
        reason: e.body_text(),
    })?;
    tracing::info!(id, "Updating student");

    let repo = Arc::clone(&state.repo);
    let deadline = state.config.store_timeout;
    let student = run_on_pool(&state, async move { repo.update(id, draft, deadline).await }).await?;

    tracing::info!(id, "Student updated");
    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<AppState>,
    id: Result<Path<StudentId>, PathRejection>,
) -> Result<StatusCode, Error> {
    let Path(id) = id.map_err(|_| Error::InvalidRequest {
        reason: "invalid student id".into(),
    })?;
    tracing::info!(id, "Deleting student");

    let repo = Arc::clone(&state.repo);
    let deadline = state.config.store_timeout;
    run_on_pool(&state, async move { repo.delete(id, deadline).await }).await?;

    tracing::info!(id, "Student deleted");
    Ok(StatusCode::NO_CONTENT)
}
