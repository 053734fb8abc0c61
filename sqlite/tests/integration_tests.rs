//! Integration tests for `SqliteTodoRepository`.
//!
//! Most tests run against a private in-memory database; the persistence
//! tests use a WAL-mode file in a temporary directory.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code uses expect for clear failure messages

use checkmark_core::repository::{RepositoryError, TodoRepository};
use checkmark_core::todo::{Todo, TodoId};
use checkmark_sqlite::SqliteTodoRepository;

async fn repo() -> SqliteTodoRepository {
    SqliteTodoRepository::in_memory()
        .await
        .expect("Failed to open in-memory database")
}

fn todo(id: i64, label: &str, checked: bool) -> Todo {
    Todo::new(TodoId::new(id), label, "Wed Jan 01 2025").with_checked(checked)
}

#[tokio::test]
async fn test_empty_store_lists_nothing() {
    let repo = repo().await;

    assert_eq!(repo.list_all().await.unwrap(), vec![]);
    assert_eq!(repo.get_by_id(TodoId::new(1)).await.unwrap(), None);
}

#[tokio::test]
async fn test_create_then_get_and_list_in_id_order() {
    let repo = repo().await;

    let created = repo.create(todo(30, "third", false)).await.unwrap();
    repo.create(todo(10, "first", true)).await.unwrap();
    repo.create(todo(20, "second", false)).await.unwrap();

    assert_eq!(created, todo(30, "third", false));
    assert_eq!(
        repo.get_by_id(TodoId::new(10)).await.unwrap(),
        Some(todo(10, "first", true))
    );

    let labels: Vec<String> = repo
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.label)
        .collect();
    assert_eq!(labels, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_duplicate_id_is_a_conflict_and_keeps_the_original() {
    let repo = repo().await;
    repo.create(todo(1, "original", false)).await.unwrap();

    let result = repo.create(todo(1, "impostor", true)).await;

    assert_eq!(result, Err(RepositoryError::Conflict(TodoId::new(1))));
    assert_eq!(
        repo.get_by_id(TodoId::new(1)).await.unwrap(),
        Some(todo(1, "original", false))
    );
}

#[tokio::test]
async fn test_toggle_is_idempotent() {
    let repo = repo().await;
    repo.create(todo(1, "walk the dog", false)).await.unwrap();

    let first = repo.toggle(TodoId::new(1), true).await.unwrap();
    let second = repo.toggle(TodoId::new(1), true).await.unwrap();

    assert_eq!(first, Some(todo(1, "walk the dog", true)));
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_toggle_unknown_id_returns_none_and_changes_nothing() {
    let repo = repo().await;
    repo.create(todo(1, "a", false)).await.unwrap();

    assert_eq!(repo.toggle(TodoId::new(2), true).await.unwrap(), None);
    assert_eq!(repo.list_all().await.unwrap(), vec![todo(1, "a", false)]);
}

#[tokio::test]
async fn test_delete_by_id_reports_whether_a_row_was_removed() {
    let repo = repo().await;
    repo.create(todo(1, "a", false)).await.unwrap();

    assert!(repo.delete_by_id(TodoId::new(1)).await.unwrap());
    assert!(!repo.delete_by_id(TodoId::new(1)).await.unwrap());
    assert!(repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_all_checked_leaves_unchecked() {
    let repo = repo().await;
    repo.create(todo(1, "a", true)).await.unwrap();
    repo.create(todo(2, "b", false)).await.unwrap();
    repo.create(todo(3, "c", true)).await.unwrap();

    assert_eq!(repo.delete_all_checked().await.unwrap(), 2);
    assert_eq!(repo.list_all().await.unwrap(), vec![todo(2, "b", false)]);
    assert_eq!(repo.delete_all_checked().await.unwrap(), 0);
}

#[tokio::test]
async fn test_set_all_checked_updates_every_row() {
    let repo = repo().await;
    repo.create(todo(1, "a", true)).await.unwrap();
    repo.create(todo(2, "b", false)).await.unwrap();

    let all = repo.set_all_checked(true).await.unwrap();
    assert!(all.iter().all(|t| t.checked));
    assert_eq!(all.len(), 2);

    let none = repo.set_all_checked(false).await.unwrap();
    assert!(none.iter().all(|t| !t.checked));
}

#[tokio::test]
async fn test_set_all_checked_on_empty_store() {
    let repo = repo().await;

    assert_eq!(repo.set_all_checked(true).await.unwrap(), vec![]);
}

#[tokio::test]
async fn test_check_constraint_rejects_out_of_range_flags() {
    let repo = repo().await;

    let result = sqlx::query("INSERT INTO todos (id, label, date, checked) VALUES (1, 'x', 'd', 2)")
        .execute(repo.pool())
        .await;

    assert!(result.is_err(), "CHECK constraint should reject checked = 2");
    assert!(repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_closed_pool_is_unavailable() {
    let repo = repo().await;
    repo.close().await;

    assert!(matches!(
        repo.list_all().await,
        Err(RepositoryError::Unavailable(_))
    ));
    assert!(matches!(repo.ping().await, Err(RepositoryError::Unavailable(_))));
}

#[tokio::test]
async fn test_records_survive_reopening_the_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("todos.sqlite3").display());

    {
        let repo = SqliteTodoRepository::connect(&url, 2).await.unwrap();
        repo.create(todo(1, "persisted", true)).await.unwrap();
        repo.close().await;
    }

    let reopened = SqliteTodoRepository::connect(&url, 2).await.unwrap();
    assert_eq!(
        reopened.list_all().await.unwrap(),
        vec![todo(1, "persisted", true)]
    );
}

#[tokio::test]
async fn test_file_database_uses_wal() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("wal.sqlite3").display());
    let repo = SqliteTodoRepository::connect(&url, 1).await.unwrap();

    let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
        .fetch_one(repo.pool())
        .await
        .unwrap();

    assert_eq!(mode.to_lowercase(), "wal");
}
