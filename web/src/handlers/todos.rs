//! Todo CRUD handlers.
//!
//! Every handler validates its input before touching the record store.

use crate::error::AppError;
use crate::extractors::{CorrelationId, JsonBody, TodoIdPath};
use crate::state::AppState;
use crate::validation::{parse_checked_update, parse_draft};
use axum::{extract::State, http::StatusCode, Json};
use checkmark_core::repository::RepositoryError;
use checkmark_core::todo::{display_date, DeletedCount, Todo, TodoDraft};

/// Attempts to find a free synthesized id before giving up with 409.
const ID_ATTEMPTS: usize = 3;

/// `GET /todos`
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(state.repository.list_all().await?))
}

/// `GET /todos/:id`
pub async fn get_todo(
    State(state): State<AppState>,
    TodoIdPath(id): TodoIdPath,
) -> Result<Json<Todo>, AppError> {
    state
        .repository
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(id))
}

/// `POST /todos`
///
/// Missing fields are filled in: a fresh id, today's date, `checked: false`.
/// A caller-chosen id that already exists is a 409.
pub async fn create_todo(
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let mut draft = parse_draft(&body)?;
    let date = draft
        .date
        .take()
        .unwrap_or_else(|| display_date(state.clock.now()));
    let draft = draft.with_date(date);

    let todo = if let Some(id) = draft.id {
        state.repository.create(draft.into_todo(id, String::new)).await?
    } else {
        create_with_fresh_id(&state, draft).await?
    };

    tracing::info!(%correlation_id, id = %todo.id, checked = todo.checked, "Created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn create_with_fresh_id(state: &AppState, draft: TodoDraft) -> Result<Todo, AppError> {
    let mut last_conflict = None;

    for attempt in 1..=ID_ATTEMPTS {
        let todo = draft.clone().into_todo(state.ids.next_id(), String::new);
        match state.repository.create(todo).await {
            Ok(created) => return Ok(created),
            Err(RepositoryError::Conflict(id)) => {
                tracing::debug!(%id, attempt, "Synthesized id already taken");
                last_conflict = Some(RepositoryError::Conflict(id));
            },
            Err(error) => return Err(error.into()),
        }
    }

    Err(last_conflict.map_or_else(
        || AppError::conflict("Could not allocate a todo id"),
        AppError::from,
    ))
}

/// `PATCH /todos`: set every todo to the same `checked` value.
pub async fn set_all_checked(
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
    JsonBody(body): JsonBody,
) -> Result<Json<Vec<Todo>>, AppError> {
    let update = parse_checked_update(&body)?;
    let todos = state.repository.set_all_checked(update.checked).await?;

    tracing::info!(%correlation_id, checked = update.checked, count = todos.len(), "Updated all todos");
    Ok(Json(todos))
}

/// `PATCH /todos/:id`
///
/// Checks existence before writing, so an unknown id is always a 404 and
/// never a silent no-op.
pub async fn set_checked(
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
    TodoIdPath(id): TodoIdPath,
    JsonBody(body): JsonBody,
) -> Result<Json<Todo>, AppError> {
    let update = parse_checked_update(&body)?;

    if state.repository.get_by_id(id).await?.is_none() {
        return Err(AppError::not_found(id));
    }

    // None here means the row was deleted between the check and the write
    let todo = state
        .repository
        .toggle(id, update.checked)
        .await?
        .ok_or_else(|| AppError::not_found(id))?;

    tracing::info!(%correlation_id, %id, checked = todo.checked, "Updated todo");
    Ok(Json(todo))
}

/// `DELETE /todos/:id`
pub async fn delete_todo(
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
    TodoIdPath(id): TodoIdPath,
) -> Result<StatusCode, AppError> {
    if !state.repository.delete_by_id(id).await? {
        return Err(AppError::not_found(id));
    }

    tracing::info!(%correlation_id, %id, "Deleted todo");
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /todos`: remove every checked todo.
pub async fn delete_checked(
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
) -> Result<Json<DeletedCount>, AppError> {
    let deleted = state.repository.delete_all_checked().await?;

    tracing::info!(%correlation_id, deleted, "Deleted checked todos");
    Ok(Json(DeletedCount { deleted }))
}

/// Fallback for `/todos/` with an empty id segment.
#[allow(clippy::unused_async)]
pub async fn reject_empty_id() -> AppError {
    AppError::bad_request("Invalid todo id: \"\"")
}
