//! HTTP boundary for Checkmark todos.
//!
//! A thin imperative shell over the record store: parse and validate the
//! request, make one repository call, map the result to a response.
//!
//! # Request Flow
//!
//! 1. **Correlation layer** tags the request and opens a tracing span
//! 2. **Extractors** parse the path id and JSON body (400 on failure)
//! 3. **Validation** checks each body field
//! 4. **Repository call** against the shared `TodoRepository`
//! 5. **Error mapping** turns `RepositoryError` into 404/409/500/503
//!
//! # Example
//!
//! ```ignore
//! use checkmark_web::{todo_router, AppState};
//!
//! let repository = Arc::new(SqliteTodoRepository::connect("sqlite://db.sqlite3", 5).await?);
//! let app = Router::new().nest("/api", todo_router(AppState::with_defaults(repository)));
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod validation;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{CorrelationId, JsonBody, TodoIdPath};
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};
pub use router::todo_router;
pub use state::AppState;
pub use validation::ValidationError;
