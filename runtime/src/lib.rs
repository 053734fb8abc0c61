//! # Checkmark Runtime
//!
//! Store runtime that coordinates reducer execution and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: owns the state and runs the reducer under a write lock
//! - **Effect Executor**: spawns effects and feeds their actions back to the reducer
//! - **Feedback Broadcast**: tells request/response callers what became of each fed-back action
//!
//! ## Example
//!
//! ```ignore
//! use checkmark_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Fire and forget
//! store.send(Action::DoSomething).await?;
//!
//! // Wait for the effect's answer, already reduced
//! let done = store
//!     .send_and_wait_for(Action::Fetch { id }, |a| a.completes(id), timeout)
//!     .await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use checkmark_core::{effect::Effect, reducer::Reducer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, RwLock};
use tracing::Instrument;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// Also returned to a `send_and_wait_for` caller whose result arrived
        /// after shutdown began and was therefore never reduced.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for terminal action
        #[error("Timeout waiting for action")]
        Timeout,

        /// Feedback broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Capacity of the feedback broadcast channel
pub const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// What became of an action produced by an effect
#[derive(Debug, Clone)]
enum Feedback<A> {
    /// Reduced into state
    Reduced(A),
    /// Refused because the store was shutting down
    Rejected(A),
}

/// Marks one running effect; dropping it (even while unwinding from a
/// panicking effect) marks the effect finished.
struct RunningEffect(Arc<watch::Sender<usize>>);

impl Drop for RunningEffect {
    fn drop(&mut self) {
        self.0.send_modify(|running| *running = running.saturating_sub(1));
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        broadcast, watch, Arc, AtomicBool, Duration, Effect, Feedback, Instrument, Ordering,
        Reducer, RunningEffect, RwLock, StoreError, DEFAULT_BROADCAST_CAPACITY,
    };

    /// The Store - runtime coordinator for a reducer
    ///
    /// Actions produced by effects are reduced first and announced second,
    /// so a `send_and_wait_for` caller that gets its result back can already
    /// read the state that result produced.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        running: Arc<watch::Sender<usize>>,
        feedback: broadcast::Sender<Feedback<A>>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (feedback, _) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
            let (running, _) = watch::channel(0);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                running: Arc::new(running),
                feedback,
            }
        }

        /// Initiate graceful shutdown of the store
        ///
        /// Sets the shutdown flag (rejecting new actions and any action an
        /// in-flight effect still produces), then waits for running effects
        /// until `timeout` elapses.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// running effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let mut running = self.running.subscribe();
            let drained = tokio::time::timeout(timeout, running.wait_for(|n| *n == 0))
                .await
                .is_ok();

            if drained {
                tracing::info!("All effects completed, shutdown successful");
                Ok(())
            } else {
                let pending = *self.running.borrow();
                tracing::error!(pending_effects = pending, "Shutdown timed out");
                metrics::counter!("store.shutdown.timeout").increment(1);
                Err(StoreError::ShutdownTimeout(pending))
            }
        }

        /// Send an action to the store
        ///
        /// Runs the reducer under the state write lock and spawns the
        /// returned effects. Returns once the reducer ran, not once the
        /// effects finished. Concurrent sends serialize at the reducer.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("store.commands.total").increment(1);

            let mut state = self.state.write().await;
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            tracing::trace!(effects = effects.len(), "Reducer completed");

            // Spawned while the lock is held so `shutdown` never sees a
            // reduced action whose effects are not yet counted.
            for effect in effects {
                self.execute_effect(effect);
            }

            Ok(())
        }

        /// Send an action and wait for a matching result action
        ///
        /// Subscribes before sending, so no result can be missed, then waits
        /// for the first effect-produced action that satisfies `predicate`.
        /// On `Ok` that action has already been reduced into state.
        ///
        /// Use correlation ids in actions to tell concurrent requests apart.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action within `timeout`
        /// - [`StoreError::ShutdownInProgress`]: the store is shutting down, or
        ///   the matching action arrived after shutdown began and was not reduced
        /// - [`StoreError::ChannelClosed`]: the broadcast channel closed
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut feedback = self.feedback.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match feedback.recv().await {
                        Ok(Feedback::Reduced(action)) if predicate(&action) => return Ok(action),
                        Ok(Feedback::Rejected(action)) if predicate(&action) => {
                            return Err(StoreError::ShutdownInProgress);
                        },
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Feedback receiver lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.records.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Reduce an effect-produced action, then announce the outcome.
        async fn feed_back(&self, action: A) {
            let outcome = match self.send(action.clone()).await {
                Ok(()) => Feedback::Reduced(action),
                Err(error) => {
                    tracing::debug!(%error, "Effect result not reduced");
                    Feedback::Rejected(action)
                },
            };
            let _ = self.feedback.send(outcome);
        }

        fn execute_effect(&self, effect: Effect<A>) {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    self.running.send_modify(|running| *running += 1);
                    let guard = RunningEffect(Arc::clone(&self.running));
                    let store = self.clone();

                    tokio::spawn(
                        async move {
                            let _guard = guard;
                            if let Some(action) = fut.await {
                                store.feed_back(action).await;
                            }
                        }
                        .instrument(tracing::debug_span!("execute_effect")),
                    );
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                running: Arc::clone(&self.running),
                feedback: self.feedback.clone(),
            }
        }
    }
}

pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use checkmark_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
    use std::time::Duration;

    #[derive(Debug, Clone, Default)]
    struct Tally {
        total: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TallyAction {
        Add(i32),
        AddLater(i32, Duration),
        Explode,
    }

    #[derive(Debug, Clone)]
    struct TallyReducer;

    impl Reducer for TallyReducer {
        type State = Tally;
        type Action = TallyAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TallyAction::Add(amount) => {
                    state.total += amount;
                    SmallVec::new()
                },
                TallyAction::AddLater(amount, delay) => smallvec![Effect::future(async move {
                    tokio::time::sleep(delay).await;
                    TallyAction::Add(amount)
                })],
                TallyAction::Explode => {
                    #[allow(clippy::panic)]
                    {
                        smallvec![Effect::Future(Box::pin(async {
                            panic!("effect failed on purpose");
                        }))]
                    }
                },
            }
        }
    }

    fn store() -> Store<Tally, TallyAction, (), TallyReducer> {
        Store::new(Tally::default(), TallyReducer, ())
    }

    #[tokio::test]
    async fn sends_apply_in_order() -> Result<(), StoreError> {
        let store = store();

        store.send(TallyAction::Add(2)).await?;
        store.send(TallyAction::Add(3)).await?;
        store.send(TallyAction::Add(-1)).await?;

        assert_eq!(store.state(|s| s.total).await, 4);
        Ok(())
    }

    #[tokio::test]
    #[allow(clippy::panic)]
    async fn concurrent_sends_serialize() {
        let store = store();

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.send(TallyAction::Add(1)).await })
            })
            .collect();

        for task in tasks {
            match task.await {
                Ok(result) => assert!(result.is_ok()),
                Err(e) => panic!("send task panicked: {e}"),
            }
        }

        assert_eq!(store.state(|s| s.total).await, 10);
    }

    #[tokio::test]
    async fn clones_share_state() -> Result<(), StoreError> {
        let first = store();
        let second = first.clone();

        first.send(TallyAction::Add(1)).await?;
        assert_eq!(second.state(|s| s.total).await, 1);

        second.send(TallyAction::Add(1)).await?;
        assert_eq!(first.state(|s| s.total).await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn effect_output_is_fed_back() -> Result<(), StoreError> {
        let store = store();

        let result = store
            .send_and_wait_for(
                TallyAction::AddLater(5, Duration::from_millis(1)),
                |a| *a == TallyAction::Add(5),
                Duration::from_secs(1),
            )
            .await?;

        assert_eq!(result, TallyAction::Add(5));
        assert_eq!(store.state(|s| s.total).await, 5);
        Ok(())
    }

    #[tokio::test]
    async fn panicking_effect_still_counts_as_finished() -> Result<(), StoreError> {
        let store = store();

        store.send(TallyAction::Explode).await?;

        store.shutdown(Duration::from_secs(1)).await?;
        assert_eq!(store.state(|s| s.total).await, 0);
        Ok(())
    }

    mod shutdown {
        use super::*;

        #[tokio::test]
        async fn completes_immediately_when_idle() {
            assert!(store().shutdown(Duration::from_secs(5)).await.is_ok());
        }

        #[tokio::test]
        async fn rejects_new_actions() {
            let store = store();
            let _ = store.shutdown(Duration::from_secs(1)).await;

            let result = store.send(TallyAction::Add(1)).await;

            assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
        }

        #[tokio::test]
        async fn waits_for_running_effects_and_drops_their_output() -> Result<(), StoreError> {
            let store = store();
            store
                .send(TallyAction::AddLater(1, Duration::from_millis(30)))
                .await?;

            store.shutdown(Duration::from_secs(5)).await?;

            assert_eq!(store.state(|s| s.total).await, 0);
            Ok(())
        }

        #[tokio::test]
        async fn times_out_with_effects_still_running() -> Result<(), StoreError> {
            let store = store();
            store
                .send(TallyAction::AddLater(1, Duration::from_millis(500)))
                .await?;

            let result = store.shutdown(Duration::from_millis(50)).await;

            assert!(
                matches!(result, Err(StoreError::ShutdownTimeout(1))),
                "Expected ShutdownTimeout(1), got: {result:?}"
            );
            Ok(())
        }

        #[tokio::test]
        async fn is_idempotent() {
            let store = store();

            assert!(store.shutdown(Duration::from_secs(1)).await.is_ok());
            assert!(store.shutdown(Duration::from_secs(1)).await.is_ok());
        }
    }
}
