//! In-memory record store for fast, deterministic testing.
//!
//! Mirrors the SQLite adapter's observable behaviour: ascending id order,
//! conflict on duplicate ids, and update-then-re-read toggles.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use checkmark_core::repository::{RepositoryError, RepositoryFuture, Result, TodoRepository};
use checkmark_core::todo::{Todo, TodoId};
use std::collections::BTreeMap;
use std::future::ready;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// `BTreeMap`-backed [`TodoRepository`].
///
/// Clones share the same records, so a test can keep a handle for
/// inspection while the code under test owns another.
///
/// # Example
///
/// ```
/// use checkmark_testing::InMemoryTodoRepository;
/// use checkmark_core::repository::TodoRepository;
/// use checkmark_core::todo::{Todo, TodoId};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = InMemoryTodoRepository::new();
/// repo.create(Todo::new(TodoId::new(1), "Buy milk", "today")).await?;
///
/// assert_eq!(repo.list_all().await?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTodoRepository {
    records: Arc<RwLock<BTreeMap<TodoId, Todo>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryTodoRepository {
    /// Create a new empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `records`
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = Todo>) -> Self {
        let map = records.into_iter().map(|todo| (todo.id, todo)).collect();
        Self {
            records: Arc::new(RwLock::new(map)),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every subsequent operation fail with
    /// [`RepositoryError::Unavailable`] (or recover with `false`)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Current records, ascending by id
    #[must_use]
    pub fn snapshot(&self) -> Vec<Todo> {
        self.records.read().unwrap().values().cloned().collect()
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Check if the repository is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RepositoryError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn list_sync(&self) -> Result<Vec<Todo>> {
        self.check_available()?;
        Ok(self.snapshot())
    }

    fn create_sync(&self, todo: Todo) -> Result<Todo> {
        self.check_available()?;
        let mut records = self.records.write().unwrap();
        if records.contains_key(&todo.id) {
            return Err(RepositoryError::Conflict(todo.id));
        }
        records.insert(todo.id, todo.clone());
        Ok(todo)
    }

    fn toggle_sync(&self, id: TodoId, checked: bool) -> Result<Option<Todo>> {
        self.check_available()?;
        let mut records = self.records.write().unwrap();
        if let Some(todo) = records.get_mut(&id) {
            todo.checked = checked;
        }
        Ok(records.get(&id).cloned())
    }

    fn set_all_sync(&self, checked: bool) -> Result<Vec<Todo>> {
        self.check_available()?;
        let mut records = self.records.write().unwrap();
        for todo in records.values_mut() {
            todo.checked = checked;
        }
        Ok(records.values().cloned().collect())
    }

    fn delete_checked_sync(&self) -> Result<u64> {
        self.check_available()?;
        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|_, todo| !todo.checked);
        Ok((before - records.len()) as u64)
    }
}

impl TodoRepository for InMemoryTodoRepository {
    fn list_all(&self) -> RepositoryFuture<'_, Vec<Todo>> {
        Box::pin(ready(self.list_sync()))
    }

    fn get_by_id(&self, id: TodoId) -> RepositoryFuture<'_, Option<Todo>> {
        let result = self
            .check_available()
            .map(|()| self.records.read().unwrap().get(&id).cloned());
        Box::pin(ready(result))
    }

    fn create(&self, todo: Todo) -> RepositoryFuture<'_, Todo> {
        Box::pin(ready(self.create_sync(todo)))
    }

    fn toggle(&self, id: TodoId, checked: bool) -> RepositoryFuture<'_, Option<Todo>> {
        Box::pin(ready(self.toggle_sync(id, checked)))
    }

    fn delete_by_id(&self, id: TodoId) -> RepositoryFuture<'_, bool> {
        let result = self
            .check_available()
            .map(|()| self.records.write().unwrap().remove(&id).is_some());
        Box::pin(ready(result))
    }

    fn delete_all_checked(&self) -> RepositoryFuture<'_, u64> {
        Box::pin(ready(self.delete_checked_sync()))
    }

    fn set_all_checked(&self, checked: bool) -> RepositoryFuture<'_, Vec<Todo>> {
        Box::pin(ready(self.set_all_sync(checked)))
    }

    fn ping(&self) -> RepositoryFuture<'_, ()> {
        Box::pin(ready(self.check_available()))
    }
}
