//! Route table.

use crate::handlers::{health, todos};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the todo API with health endpoints, correlation IDs and request
/// tracing.
///
/// Routes are mounted at the root; nest the result to add a prefix.
pub fn todo_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/todos",
            get(todos::list_todos)
                .post(todos::create_todo)
                .patch(todos::set_all_checked)
                .delete(todos::delete_checked),
        )
        .route("/todos/", any(todos::reject_empty_id))
        .route(
            "/todos/:id",
            get(todos::get_todo)
                .patch(todos::set_checked)
                .delete(todos::delete_todo),
        )
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness))
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
