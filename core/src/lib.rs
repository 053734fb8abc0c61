//! # Checkmark Core
//!
//! Core traits and types for the Checkmark todo service.
//!
//! This crate provides the abstractions shared by the server and the client
//! session:
//!
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies (clock, id generation)
//! - **Domain**: [`todo::Todo`], [`todo::TodoDraft`], [`todo::Filter`]
//! - **Ports**: [`repository::TodoRepository`] (durable record store) and
//!   [`api::TodoApi`] (the request/response boundary seen by clients)
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```ignore
//! use checkmark_core::*;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = CounterEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         env: &CounterEnvironment,
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         state.count += 1;
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

pub mod api;
pub mod repository;
pub mod todo;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Returns
        ///
        /// The effects to be executed by the runtime. Most actions produce
        /// zero or one effect, so the inline capacity avoids allocation.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe work for the runtime to perform after a reducer ran.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are returned from reducers
    /// and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async computation whose output is always fed back
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Action> + Send + 'static,
        {
            Effect::Future(Box::pin(async move { Some(fut.await) }))
        }

        /// Returns `true` for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use crate::todo::TodoId;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Source of fresh todo ids for records created without one
    pub trait IdGenerator: Send + Sync {
        /// Issue the next id
        fn next_id(&self) -> TodoId;
    }

    /// Millisecond-clock id generator
    ///
    /// Ids follow wall-clock milliseconds but never repeat or go backwards
    /// within a process: two requests in the same millisecond (or a clock
    /// step backwards) still receive strictly increasing ids.
    pub struct ClockIdGenerator {
        clock: Arc<dyn Clock>,
        last: AtomicI64,
    }

    impl ClockIdGenerator {
        /// Creates a generator reading from `clock`
        #[must_use]
        pub fn new(clock: Arc<dyn Clock>) -> Self {
            Self {
                clock,
                last: AtomicI64::new(0),
            }
        }
    }

    impl std::fmt::Debug for ClockIdGenerator {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ClockIdGenerator")
                .field("last", &self.last.load(Ordering::Relaxed))
                .finish_non_exhaustive()
        }
    }

    impl IdGenerator for ClockIdGenerator {
        fn next_id(&self) -> TodoId {
            let now = self.clock.now().timestamp_millis();
            let mut last = self.last.load(Ordering::Acquire);
            loop {
                let candidate = now.max(last.saturating_add(1));
                match self.last.compare_exchange_weak(
                    last,
                    candidate,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => return TodoId::new(candidate),
                    Err(observed) => last = observed,
                }
            }
        }
    }
}
