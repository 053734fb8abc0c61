//! Application state for Axum handlers.

use checkmark_core::environment::{Clock, ClockIdGenerator, IdGenerator, SystemClock};
use checkmark_core::repository::TodoRepository;
use std::sync::Arc;

/// Dependencies shared by every handler.
///
/// Cloned per request; all fields are reference-counted.
///
/// # Examples
///
/// ```ignore
/// let state = AppState::with_defaults(Arc::new(SqliteTodoRepository::in_memory().await?));
/// let app = todo_router(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Durable record store
    pub repository: Arc<dyn TodoRepository>,
    /// Issues ids for todos created without one
    pub ids: Arc<dyn IdGenerator>,
    /// Source of the default display date
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create state from explicit dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn TodoRepository>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            ids,
            clock,
        }
    }

    /// Production wiring: system clock and millisecond-clock ids.
    #[must_use]
    pub fn with_defaults(repository: Arc<dyn TodoRepository>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let ids = Arc::new(ClockIdGenerator::new(Arc::clone(&clock)));
        Self::new(repository, ids, clock)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
