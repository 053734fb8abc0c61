//! Client reducer: pessimistic reconciliation with the server.
//!
//! Server commands change nothing locally; they emit one effect calling the
//! [`TodoApi`]. Only the result action, carrying the server's answer,
//! rewrites the snapshot. Failures leave state exactly as it was.

use crate::action::{ClientAction, RequestId};
use crate::state::ClientState;
use checkmark_core::api::{ApiError, TodoApi};
use checkmark_core::effect::Effect;
use checkmark_core::reducer::Reducer;
use checkmark_core::{smallvec, SmallVec};
use std::future::Future;
use std::sync::Arc;

/// Dependencies of [`ClientReducer`]
#[derive(Clone)]
pub struct ClientEnvironment {
    /// Server the mirror reconciles with
    pub api: Arc<dyn TodoApi>,
}

impl ClientEnvironment {
    /// Environment talking to `api`
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self { api }
    }
}

impl std::fmt::Debug for ClientEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for [`ClientState`]
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientReducer;

impl ClientReducer {
    /// Creates a new `ClientReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// One API call whose outcome is fed back as a result action
    fn call<T, F>(
        request: RequestId,
        call: F,
        on_success: impl FnOnce(T) -> ClientAction + Send + 'static,
    ) -> SmallVec<[Effect<ClientAction>; 4]>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        smallvec![Effect::future(async move {
            match call.await {
                Ok(value) => on_success(value),
                Err(error) => ClientAction::RequestFailed { request, error },
            }
        })]
    }
}

impl Reducer for ClientReducer {
    type State = ClientState;
    type Action = ClientAction;
    type Environment = ClientEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Local commands ==========
            ClientAction::ReplaceAll { records } => {
                state.replace(records);
                SmallVec::new()
            },
            ClientAction::SetFilter { filter } => {
                state.filter = filter;
                SmallVec::new()
            },

            // ========== Server commands ==========
            ClientAction::Create { request, draft } => {
                let api = Arc::clone(&env.api);
                Self::call(
                    request,
                    async move { api.create(draft).await },
                    move |todo| ClientAction::Created { request, todo },
                )
            },
            ClientAction::ToggleAll { request } => {
                let target = state.unchecked_count() > 0;
                let api = Arc::clone(&env.api);
                Self::call(
                    request,
                    async move { api.set_all_checked(target).await },
                    move |records| ClientAction::AllToggled { request, records },
                )
            },
            ClientAction::ToggleOne { request, todo } => {
                let api = Arc::clone(&env.api);
                Self::call(
                    request,
                    async move { api.set_checked(todo.id, !todo.checked).await },
                    move |todo| ClientAction::Toggled { request, todo },
                )
            },
            ClientAction::RemoveOne { request, todo } => {
                let api = Arc::clone(&env.api);
                let id = todo.id;
                Self::call(
                    request,
                    async move { api.delete(id).await },
                    move |()| ClientAction::Removed { request, id },
                )
            },
            ClientAction::ClearChecked { request } => {
                let api = Arc::clone(&env.api);
                Self::call(
                    request,
                    async move { api.delete_checked().await },
                    move |deleted| ClientAction::CheckedCleared { request, deleted },
                )
            },

            // ========== Results ==========
            ClientAction::Created { todo, .. } => {
                let records: Vec<_> = state.records.iter().cloned().chain([todo]).collect();
                state.replace(records);
                SmallVec::new()
            },
            ClientAction::AllToggled { records, .. } => {
                state.replace(records);
                SmallVec::new()
            },
            ClientAction::Toggled { request, todo } => {
                if !state.records.iter().any(|t| t.id == todo.id) {
                    tracing::warn!(%request, id = %todo.id, "Toggled todo is not in the local list");
                    return SmallVec::new();
                }
                let records: Vec<_> = state
                    .records
                    .iter()
                    .map(|t| if t.id == todo.id { todo.clone() } else { t.clone() })
                    .collect();
                state.replace(records);
                SmallVec::new()
            },
            ClientAction::Removed { id, .. } => {
                let records: Vec<_> = state.records.iter().filter(|t| t.id != id).cloned().collect();
                state.replace(records);
                SmallVec::new()
            },
            ClientAction::CheckedCleared { request, deleted } => {
                let records: Vec<_> = state.records.iter().filter(|t| !t.checked).cloned().collect();
                let local = state.records.len() - records.len();
                if u64::try_from(local).ok() != Some(deleted) {
                    tracing::debug!(%request, local, deleted, "Server cleared a different number of todos");
                }
                state.replace(records);
                SmallVec::new()
            },
            ClientAction::RequestFailed { request, error } => {
                tracing::warn!(%request, error = %error, "Request failed; local state unchanged");
                SmallVec::new()
            },
        }
    }
}
