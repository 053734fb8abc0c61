//! Checkmark server wiring.
//!
//! The binary in `main.rs` loads [`Config`], opens the SQLite record store
//! and serves [`build_app`] until Ctrl-C or SIGTERM.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;

pub use config::Config;

use axum::Router;
use checkmark_web::{todo_router, AppState};

/// The todo API nested under `api_prefix`.
///
/// An empty prefix or `/` mounts the routes at the root.
pub fn build_app(api_prefix: &str, state: AppState) -> Router {
    let prefix = api_prefix.trim_end_matches('/');
    let api = todo_router(state);

    if prefix.is_empty() {
        api
    } else if prefix.starts_with('/') {
        Router::new().nest(prefix, api)
    } else {
        Router::new().nest(&format!("/{prefix}"), api)
    }
}
