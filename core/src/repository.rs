//! Record store trait for durable todo persistence.
//!
//! This module defines the port the API boundary talks to. Every operation is
//! a single atomic statement against the underlying engine; there are no
//! multi-statement transactions and no write-behind caching, so a successful
//! return means the write is durable.
//!
//! # Implementations
//!
//! - `SqliteTodoRepository` (in `checkmark-sqlite`): Production implementation
//! - `InMemoryTodoRepository` (in `checkmark-testing`): Fast, deterministic testing
//!
//! # Example
//!
//! ```no_run
//! use checkmark_core::repository::{RepositoryError, TodoRepository};
//! use checkmark_core::todo::{Todo, TodoId};
//!
//! async fn example<R: TodoRepository>(repo: &R) -> Result<(), RepositoryError> {
//!     let todo = repo.create(Todo::new(TodoId::new(1), "Buy milk", "today")).await?;
//!     let toggled = repo.toggle(todo.id, true).await?;
//!     assert_eq!(toggled.map(|t| t.checked), Some(true));
//!     Ok(())
//! }
//! ```

use crate::todo::{Todo, TodoId};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Result alias for record store operations
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Boxed future returned by [`TodoRepository`] methods
pub type RepositoryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Errors that can occur during record store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The referenced todo does not exist.
    ///
    /// Not a fault: a double delete or a stale client produces this in
    /// normal operation.
    #[error("Todo with id {0} not found")]
    NotFound(TodoId),

    /// A todo with this id already exists.
    ///
    /// Raised by the engine's uniqueness constraint; existing rows are never
    /// overwritten.
    #[error("Todo with id {0} already exists")]
    Conflict(TodoId),

    /// The storage engine failed to open, read or write.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded into a [`Todo`].
    #[error("Invalid stored row: {0}")]
    InvalidRow(String),
}

/// Durable CRUD over todo records.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to be shared across request handlers.
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
/// so it can be used as `Arc<dyn TodoRepository>` in the web layer's state.
pub trait TodoRepository: Send + Sync {
    /// All todos, ascending by id. Empty when none exist.
    fn list_all(&self) -> RepositoryFuture<'_, Vec<Todo>>;

    /// A single todo, or `None` if absent.
    fn get_by_id(&self, id: TodoId) -> RepositoryFuture<'_, Option<Todo>>;

    /// Insert `todo` exactly as given.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if a todo with the same id exists.
    fn create(&self, todo: Todo) -> RepositoryFuture<'_, Todo>;

    /// Set `checked` on one todo and return it as re-read afterwards.
    ///
    /// The update is unconditional and idempotent. Updating an unknown id
    /// touches nothing, so the re-read yields `None`.
    fn toggle(&self, id: TodoId, checked: bool) -> RepositoryFuture<'_, Option<Todo>>;

    /// Remove one todo. Returns `true` iff a record was removed.
    fn delete_by_id(&self, id: TodoId) -> RepositoryFuture<'_, bool>;

    /// Remove every checked todo. Returns the number removed.
    fn delete_all_checked(&self) -> RepositoryFuture<'_, u64>;

    /// Set `checked` on every todo, regardless of its current value, and
    /// return the full list afterwards (ascending by id).
    fn set_all_checked(&self, checked: bool) -> RepositoryFuture<'_, Vec<Todo>>;

    /// Cheap round-trip used by readiness probes.
    fn ping(&self) -> RepositoryFuture<'_, ()>;
}
