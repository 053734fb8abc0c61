//! [`TodoApi`] over HTTP with reqwest.

use checkmark_core::api::{ApiError, ApiFuture, TodoApi};
use checkmark_core::todo::{CheckedUpdate, DeletedCount, Todo, TodoDraft, TodoId};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Error body returned by the server
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for the todo API.
///
/// `base_url` is everything before `/todos`, e.g. `http://localhost:3000/api`.
#[derive(Clone, Debug)]
pub struct HttpTodoApi {
    client: Client,
    base_url: String,
}

impl HttpTodoApi {
    /// Client with a fresh connection pool
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Client sharing an existing reqwest pool
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Base URL requests are made against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn todo(&self, id: TodoId) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::execute(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Decode(format!("Unreadable {status} response body: {e}")))?;
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| if body.is_empty() { status.to_string() } else { body });

        tracing::debug!(%status, %message, "Todo API returned an error");
        Err(status_error(status, message))
    }
}

/// Map a non-success status to the client error taxonomy
fn status_error(status: StatusCode, message: String) -> ApiError {
    match status {
        StatusCode::BAD_REQUEST => ApiError::Validation(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::CONFLICT => ApiError::Conflict(message),
        s if s.is_server_error() => ApiError::Unavailable(message),
        s => ApiError::Transport(format!("Unexpected status {s}: {message}")),
    }
}

impl TodoApi for HttpTodoApi {
    fn list(&self) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(Self::fetch(self.client.get(self.todos())))
    }

    fn get(&self, id: TodoId) -> ApiFuture<'_, Todo> {
        Box::pin(Self::fetch(self.client.get(self.todo(id))))
    }

    fn create(&self, draft: TodoDraft) -> ApiFuture<'_, Todo> {
        Box::pin(Self::fetch(self.client.post(self.todos()).json(&draft)))
    }

    fn set_all_checked(&self, checked: bool) -> ApiFuture<'_, Vec<Todo>> {
        Box::pin(Self::fetch(
            self.client.patch(self.todos()).json(&CheckedUpdate { checked }),
        ))
    }

    fn set_checked(&self, id: TodoId, checked: bool) -> ApiFuture<'_, Todo> {
        Box::pin(Self::fetch(
            self.client.patch(self.todo(id)).json(&CheckedUpdate { checked }),
        ))
    }

    fn delete(&self, id: TodoId) -> ApiFuture<'_, ()> {
        let request = self.client.delete(self.todo(id));
        Box::pin(async move {
            Self::execute(request).await?;
            Ok(())
        })
    }

    fn delete_checked(&self) -> ApiFuture<'_, u64> {
        let request = self.client.delete(self.todos());
        Box::pin(async move {
            let DeletedCount { deleted } = Self::fetch(request).await?;
            Ok(deleted)
        })
    }
}
