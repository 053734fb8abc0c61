//! # Checkmark Client
//!
//! Network-backed client state store for the todo list.
//!
//! The client keeps an immutable mirror of the server's records and changes
//! it only after the server confirms a write:
//!
//! - [`ClientReducer`]: commands become API effects; results rewrite the mirror
//! - [`TodoSession`]: awaitable facade over a runtime `Store`
//! - [`HttpTodoApi`]: the [`TodoApi`](checkmark_core::api::TodoApi) over reqwest
//! - [`view`]: filter and count functions
//!
//! ## Example
//!
//! ```no_run
//! use checkmark_client::{HttpTodoApi, TodoSession};
//! use checkmark_core::todo::TodoDraft;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), checkmark_client::SessionError> {
//! let session = TodoSession::new(Arc::new(HttpTodoApi::new("http://localhost:3000/api")));
//! session.bootstrap().await?;
//! let todo = session.create(TodoDraft::new("Buy milk")).await?;
//! session.toggle(&todo).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod http;
pub mod reducer;
pub mod session;
pub mod state;
pub mod view;

pub use action::{ClientAction, RequestId};
pub use http::HttpTodoApi;
pub use reducer::{ClientEnvironment, ClientReducer};
pub use session::{SessionError, TodoSession, DEFAULT_REQUEST_TIMEOUT};
pub use state::ClientState;
