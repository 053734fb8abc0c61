//! # Checkmark Testing
//!
//! Testing utilities and helpers for Checkmark.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - An in-memory [`TodoRepository`](checkmark_core::repository::TodoRepository)
//! - A scriptable [`TodoApi`](checkmark_core::api::TodoApi)
//! - A Given-When-Then harness for reducers
//! - proptest strategies for domain types
//!
//! ## Example
//!
//! ```ignore
//! use checkmark_testing::{MockTodoApi, ReducerTest};
//!
//! #[tokio::test]
//! async fn create_appends() {
//!     let api = MockTodoApi::new();
//!     let session = TodoSession::new(Arc::new(api));
//!
//!     session.create(TodoDraft::new("Buy milk")).await?;
//!     assert_eq!(session.records().await.len(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use checkmark_core::environment::{Clock, IdGenerator};
use checkmark_core::todo::TodoId;

pub mod api;
pub mod repository;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, TodoId, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use checkmark_testing::mocks::FixedClock;
    /// use checkmark_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable ids: 1, 2, 3, ...
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        next: AtomicI64,
    }

    impl SequentialIdGenerator {
        /// Start issuing ids from 1
        #[must_use]
        pub const fn new() -> Self {
            Self::starting_at(1)
        }

        /// Start issuing ids from `first`
        #[must_use]
        pub const fn starting_at(first: i64) -> Self {
            Self {
                next: AtomicI64::new(first),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> TodoId {
            TodoId::new(self.next.fetch_add(1, Ordering::SeqCst))
        }
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use checkmark_core::todo::{Filter, Todo, TodoId};
    use proptest::prelude::*;

    /// Any single todo with an id in `0..10_000`
    pub fn arb_todo() -> impl Strategy<Value = Todo> {
        (0i64..10_000, "[a-z ]{1,16}", any::<bool>()).prop_map(|(id, label, checked)| {
            Todo::new(TodoId::new(id), label, "Wed Jan 01 2025").with_checked(checked)
        })
    }

    /// A list of up to `max` todos with unique, ascending ids
    pub fn arb_records(max: usize) -> impl Strategy<Value = Vec<Todo>> {
        prop::collection::btree_map(0i64..10_000, ("[a-z ]{1,16}", any::<bool>()), 0..=max)
            .prop_map(|entries| {
                entries
                    .into_iter()
                    .map(|(id, (label, checked))| {
                        Todo::new(TodoId::new(id), label, "Wed Jan 01 2025").with_checked(checked)
                    })
                    .collect()
            })
    }

    /// Any filter
    pub fn arb_filter() -> impl Strategy<Value = Filter> {
        prop::sample::select(Filter::ALL.to_vec())
    }
}

// Re-export commonly used items
pub use api::{ApiCall, MockTodoApi};
pub use mocks::{test_clock, FixedClock, SequentialIdGenerator};
pub use reducer_test::{assertions, ReducerTest};
pub use repository::InMemoryTodoRepository;
