//! Request/response facade over the client store.
//!
//! [`TodoSession`] turns each server command into an awaitable call that
//! returns only once the server answered and the answer was reduced into
//! the local mirror.

use crate::action::{ClientAction, RequestId};
use crate::reducer::{ClientEnvironment, ClientReducer};
use crate::state::ClientState;
use checkmark_core::api::{ApiError, TodoApi};
use checkmark_core::todo::{Filter, Todo, TodoDraft};
use checkmark_runtime::{Store, StoreError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// How long a session call waits for the server by default
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a session call did not complete
#[derive(Error, Debug)]
pub enum SessionError {
    /// The server rejected the request or could not be reached
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No answer within the configured timeout
    #[error("No response within {0:?}")]
    Timeout(Duration),

    /// The store refused the command, or shut down before reducing its result
    #[error("Client store error: {0}")]
    Store(StoreError),

    /// The store answered with a result of the wrong kind
    #[error("Unexpected result action: {0}")]
    UnexpectedResult(String),
}

impl SessionError {
    /// Whether the server reported the todo as missing
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(error) if error.is_not_found())
    }
}

type ClientStore = Store<ClientState, ClientAction, ClientEnvironment, ClientReducer>;

/// One client's view of the todo list.
///
/// Construct one per client and drop it when the client goes away.
///
/// # Example
///
/// ```ignore
/// let session = TodoSession::new(Arc::new(HttpTodoApi::new("http://localhost:3000/api")));
/// session.bootstrap().await?;
/// session.create(TodoDraft::new("Buy milk")).await?;
/// assert_eq!(session.unchecked_count().await, 1);
/// ```
pub struct TodoSession {
    store: ClientStore,
    api: Arc<dyn TodoApi>,
    timeout: Duration,
    next_request: AtomicU64,
}

impl TodoSession {
    /// Empty session talking to `api`
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        let store = Store::new(
            ClientState::default(),
            ClientReducer::new(),
            ClientEnvironment::new(Arc::clone(&api)),
        );

        Self {
            store,
            api,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            next_request: AtomicU64::new(1),
        }
    }

    /// Replace the per-call timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load the server's list into the mirror.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Api`] if the list cannot be fetched; the
    /// mirror is left unchanged.
    pub async fn bootstrap(&self) -> Result<(), SessionError> {
        let records = tokio::time::timeout(self.timeout, self.api.list())
            .await
            .map_err(|_| SessionError::Timeout(self.timeout))??;

        tracing::debug!(count = records.len(), "Loaded todos");
        self.replace_all(records).await
    }

    /// Overwrite the mirror without contacting the server.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] after shutdown.
    pub async fn replace_all(&self, records: Vec<Todo>) -> Result<(), SessionError> {
        self.store
            .send(ClientAction::ReplaceAll { records })
            .await
            .map_err(SessionError::Store)?;
        Ok(())
    }

    /// Change the visible partition.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] after shutdown.
    pub async fn set_filter(&self, filter: Filter) -> Result<(), SessionError> {
        self.store
            .send(ClientAction::SetFilter { filter })
            .await
            .map_err(SessionError::Store)?;
        Ok(())
    }

    /// Create a todo and append the server's record.
    ///
    /// # Errors
    ///
    /// See [`SessionError`]. The mirror is unchanged on error.
    pub async fn create(&self, draft: TodoDraft) -> Result<Todo, SessionError> {
        match self.request(|request| ClientAction::Create { request, draft }).await? {
            ClientAction::Created { todo, .. } => Ok(todo),
            other => Err(unexpected(&other)),
        }
    }

    /// Check everything, or uncheck everything if nothing is unchecked.
    ///
    /// # Errors
    ///
    /// See [`SessionError`]. The mirror is unchanged on error.
    pub async fn toggle_all(&self) -> Result<(), SessionError> {
        match self.request(|request| ClientAction::ToggleAll { request }).await? {
            ClientAction::AllToggled { .. } => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    /// Flip `todo`'s checked state and return the server's record.
    ///
    /// # Errors
    ///
    /// See [`SessionError`]. The mirror is unchanged on error.
    pub async fn toggle(&self, todo: &Todo) -> Result<Todo, SessionError> {
        let todo = todo.clone();
        match self.request(|request| ClientAction::ToggleOne { request, todo }).await? {
            ClientAction::Toggled { todo, .. } => Ok(todo),
            other => Err(unexpected(&other)),
        }
    }

    /// Delete `todo`.
    ///
    /// # Errors
    ///
    /// See [`SessionError`]. The mirror is unchanged on error.
    pub async fn remove(&self, todo: &Todo) -> Result<(), SessionError> {
        let todo = todo.clone();
        match self.request(|request| ClientAction::RemoveOne { request, todo }).await? {
            ClientAction::Removed { .. } => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    /// Delete every checked todo and return how many the server removed.
    ///
    /// # Errors
    ///
    /// See [`SessionError`]. The mirror is unchanged on error.
    pub async fn clear_checked(&self) -> Result<u64, SessionError> {
        match self.request(|request| ClientAction::ClearChecked { request }).await? {
            ClientAction::CheckedCleared { deleted, .. } => Ok(deleted),
            other => Err(unexpected(&other)),
        }
    }

    /// Current records, in mirror order
    pub async fn records(&self) -> Arc<[Todo]> {
        self.store.state(|s| Arc::clone(&s.records)).await
    }

    /// Records visible under the current filter
    pub async fn filtered_records(&self) -> Vec<Todo> {
        self.store.state(ClientState::filtered).await
    }

    /// Number of unchecked records
    pub async fn unchecked_count(&self) -> usize {
        self.store.state(ClientState::unchecked_count).await
    }

    /// Whether any record is checked
    pub async fn any_checked(&self) -> bool {
        self.store.state(ClientState::any_checked).await
    }

    /// Current filter
    pub async fn filter(&self) -> Filter {
        self.store.state(|s| s.filter).await
    }

    /// Copy of the whole client state
    pub async fn snapshot(&self) -> ClientState {
        self.store.state(ClientState::clone).await
    }

    /// Stop accepting commands and wait for in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if requests are still running after
    /// `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), SessionError> {
        self.store.shutdown(timeout).await.map_err(SessionError::Store)
    }

    fn next_request_id(&self) -> RequestId {
        RequestId::new(self.next_request.fetch_add(1, Ordering::Relaxed))
    }

    /// Send a server command and wait for its reconciled result
    async fn request(
        &self,
        command: impl FnOnce(RequestId) -> ClientAction,
    ) -> Result<ClientAction, SessionError> {
        let request = self.next_request_id();

        let result = self
            .store
            .send_and_wait_for(command(request), move |a| a.completes(request), self.timeout)
            .await
            .map_err(|error| match error {
                StoreError::Timeout => SessionError::Timeout(self.timeout),
                other => SessionError::Store(other),
            })?;

        match result {
            ClientAction::RequestFailed { error, .. } => Err(SessionError::Api(error)),
            other => Ok(other),
        }
    }
}

impl std::fmt::Debug for TodoSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoSession")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn unexpected(action: &ClientAction) -> SessionError {
    tracing::error!(?action, "Result action does not match its command");
    SessionError::UnexpectedResult(format!("{action:?}"))
}
