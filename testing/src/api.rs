//! Scriptable [`TodoApi`] for client tests.
//!
//! [`MockTodoApi`] answers from an [`InMemoryTodoRepository`] with the same
//! status semantics as the HTTP boundary, records every call, and can be
//! told to fail upcoming calls.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use crate::mocks::{test_clock, SequentialIdGenerator};
use crate::repository::InMemoryTodoRepository;
use checkmark_core::api::{ApiError, ApiFuture, TodoApi};
use checkmark_core::environment::{Clock, IdGenerator};
use checkmark_core::repository::{RepositoryError, TodoRepository};
use checkmark_core::todo::{display_date, Todo, TodoDraft, TodoId};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A call received by [`MockTodoApi`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    /// `list()`
    List,
    /// `get(id)`
    Get(TodoId),
    /// `create(draft)`
    Create(TodoDraft),
    /// `set_all_checked(checked)`
    SetAllChecked(bool),
    /// `set_checked(id, checked)`
    SetChecked(TodoId, bool),
    /// `delete(id)`
    Delete(TodoId),
    /// `delete_checked()`
    DeleteChecked,
}

/// In-memory [`TodoApi`] with failure injection.
///
/// Clones share records, call log and scripted failures.
#[derive(Clone, Debug)]
pub struct MockTodoApi {
    repository: InMemoryTodoRepository,
    ids: Arc<SequentialIdGenerator>,
    failures: Arc<Mutex<VecDeque<ApiError>>>,
    calls: Arc<Mutex<Vec<ApiCall>>>,
    latency: Option<Duration>,
}

impl MockTodoApi {
    /// Create an API with no records
    #[must_use]
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create an API serving `records`
    ///
    /// Synthesized ids start above the largest seeded id.
    #[must_use]
    pub fn with_records(records: Vec<Todo>) -> Self {
        let next = records.iter().map(|t| t.id.value()).max().unwrap_or(0) + 1;
        Self {
            repository: InMemoryTodoRepository::with_records(records),
            ids: Arc::new(SequentialIdGenerator::starting_at(next)),
            failures: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            latency: None,
        }
    }

    /// Delay every response by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail the next call with `error` (queued, first in first out)
    pub fn fail_next(&self, error: ApiError) {
        self.failures.lock().unwrap().push_back(error);
    }

    /// Every call received so far
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The backing records, for seeding or inspection
    #[must_use]
    pub const fn repository(&self) -> &InMemoryTodoRepository {
        &self.repository
    }

    /// Log the call and pop a scripted failure, if any
    fn begin(&self, call: ApiCall) -> Option<ApiError> {
        self.calls.lock().unwrap().push(call);
        self.failures.lock().unwrap().pop_front()
    }

    fn respond<'a, T, F>(&'a self, call: ApiCall, op: F) -> ApiFuture<'a, T>
    where
        T: Send + 'a,
        F: std::future::Future<Output = Result<T, ApiError>> + Send + 'a,
    {
        let scripted = self.begin(call);
        let latency = self.latency;

        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            match scripted {
                Some(error) => Err(error),
                None => op.await,
            }
        })
    }
}

impl Default for MockTodoApi {
    fn default() -> Self {
        Self::new()
    }
}

fn to_api_error(error: RepositoryError) -> ApiError {
    match error {
        RepositoryError::NotFound(_) => ApiError::NotFound(error.to_string()),
        RepositoryError::Conflict(_) => ApiError::Conflict(error.to_string()),
        RepositoryError::Unavailable(_) | RepositoryError::InvalidRow(_) => {
            ApiError::Unavailable(error.to_string())
        },
    }
}

fn not_found(id: TodoId) -> ApiError {
    to_api_error(RepositoryError::NotFound(id))
}

impl TodoApi for MockTodoApi {
    fn list(&self) -> ApiFuture<'_, Vec<Todo>> {
        self.respond(ApiCall::List, async move {
            self.repository.list_all().await.map_err(to_api_error)
        })
    }

    fn get(&self, id: TodoId) -> ApiFuture<'_, Todo> {
        self.respond(ApiCall::Get(id), async move {
            self.repository
                .get_by_id(id)
                .await
                .map_err(to_api_error)?
                .ok_or_else(|| not_found(id))
        })
    }

    fn create(&self, draft: TodoDraft) -> ApiFuture<'_, Todo> {
        self.respond(ApiCall::Create(draft.clone()), async move {
            if draft.label.is_empty() {
                return Err(ApiError::Validation(
                    "Missing or invalid 'label'".to_string(),
                ));
            }
            let todo = draft.into_todo(self.ids.next_id(), || display_date(test_clock().now()));
            self.repository.create(todo).await.map_err(to_api_error)
        })
    }

    fn set_all_checked(&self, checked: bool) -> ApiFuture<'_, Vec<Todo>> {
        self.respond(ApiCall::SetAllChecked(checked), async move {
            self.repository
                .set_all_checked(checked)
                .await
                .map_err(to_api_error)
        })
    }

    fn set_checked(&self, id: TodoId, checked: bool) -> ApiFuture<'_, Todo> {
        self.respond(ApiCall::SetChecked(id, checked), async move {
            self.repository
                .toggle(id, checked)
                .await
                .map_err(to_api_error)?
                .ok_or_else(|| not_found(id))
        })
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()> {
        self.respond(ApiCall::Delete(id), async move {
            if self.repository.delete_by_id(id).await.map_err(to_api_error)? {
                Ok(())
            } else {
                Err(not_found(id))
            }
        })
    }

    fn delete_checked(&self) -> ApiFuture<'_, u64> {
        self.respond(ApiCall::DeleteChecked, async move {
            self.repository
                .delete_all_checked()
                .await
                .map_err(to_api_error)
        })
    }
}
