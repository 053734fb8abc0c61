//! Client-side view of the todo API boundary.
//!
//! [`TodoApi`] is what a client session depends on. The production
//! implementation speaks HTTP (`HttpTodoApi` in `checkmark-client`); tests
//! use `MockTodoApi` from `checkmark-testing`.

use crate::todo::{Todo, TodoDraft, TodoId};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`TodoApi`] methods
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Failure reported by the API boundary.
///
/// Cloneable so it can travel inside actions back into a reducer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed or missing field in the request (400).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The referenced todo does not exist (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// A todo with the requested id already exists (409).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The server or its store is unavailable (5xx).
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the failure is the server saying "no such todo"
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Request/response operations on todos, as seen by a client.
///
/// # Dyn Compatibility
///
/// Explicit `Pin<Box<dyn Future>>` returns allow `Arc<dyn TodoApi>` to be
/// captured by effects.
pub trait TodoApi: Send + Sync {
    /// `GET /todos`
    fn list(&self) -> ApiFuture<'_, Vec<Todo>>;

    /// `GET /todos/{id}`
    fn get(&self, id: TodoId) -> ApiFuture<'_, Todo>;

    /// `POST /todos`
    fn create(&self, draft: TodoDraft) -> ApiFuture<'_, Todo>;

    /// `PATCH /todos` (bulk set-all)
    fn set_all_checked(&self, checked: bool) -> ApiFuture<'_, Vec<Todo>>;

    /// `PATCH /todos/{id}`
    fn set_checked(&self, id: TodoId, checked: bool) -> ApiFuture<'_, Todo>;

    /// `DELETE /todos/{id}`
    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()>;

    /// `DELETE /todos` (bulk clear-checked)
    fn delete_checked(&self) -> ApiFuture<'_, u64>;
}
