//! SQLite record store for Checkmark.
//!
//! This crate provides [`SqliteTodoRepository`], the production implementation
//! of the `TodoRepository` trait from `checkmark-core`. It uses sqlx with:
//!
//! - WAL journal mode so readers proceed alongside the single writer
//! - Idempotent schema creation on open (no migrations)
//! - One statement per operation, durable before the call returns
//!
//! # Example
//!
//! ```no_run
//! use checkmark_sqlite::SqliteTodoRepository;
//! use checkmark_core::repository::TodoRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = SqliteTodoRepository::connect("sqlite://db.sqlite3", 5).await?;
//! let todos = repo.list_all().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use checkmark_core::repository::{RepositoryError, RepositoryFuture, Result, TodoRepository};
use checkmark_core::todo::{Todo, TodoId};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Table definition, applied with `IF NOT EXISTS` on every open.
const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY,
        label TEXT NOT NULL,
        date TEXT NOT NULL,
        checked INTEGER NOT NULL DEFAULT 0 CHECK (checked IN (0, 1))
    )
";

const SELECT_ALL: &str = "SELECT id, label, date, checked FROM todos ORDER BY id ASC";

type TodoRow = (i64, String, String, i64);

/// Decode the stored 0/1 flag. Anything else is a corrupt row.
fn decode_checked(id: i64, value: i64) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepositoryError::InvalidRow(format!(
            "todo {id} has checked = {other}, expected 0 or 1"
        ))),
    }
}

fn decode_row((id, label, date, checked): TodoRow) -> Result<Todo> {
    let checked = decode_checked(id, checked)?;
    Ok(Todo::new(TodoId::new(id), label, date).with_checked(checked))
}

fn decode_rows(rows: Vec<TodoRow>) -> Result<Vec<Todo>> {
    rows.into_iter().map(decode_row).collect()
}

fn storage_error(operation: &'static str, error: &sqlx::Error) -> RepositoryError {
    tracing::warn!(operation, error = %error, "Record store statement failed");
    RepositoryError::Unavailable(format!("Failed to {operation}: {error}"))
}

fn record(operation: &'static str) {
    metrics::counter!("repository.operations", "operation" => operation).increment(1);
}

/// SQLite-backed [`TodoRepository`].
///
/// Cloning is cheap: clones share the connection pool.
#[derive(Clone, Debug)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    /// Open (creating if missing) the database at `database_url` and ensure
    /// the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Unavailable`] if the URL is invalid, the
    /// database cannot be opened, or the schema cannot be created.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| RepositoryError::Unavailable(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::Unavailable(format!("Failed to connect: {e}")))?;

        tracing::info!(database_url, max_connections, "Opened SQLite record store");
        Self::from_pool(pool).await
    }

    /// A private in-memory database on a single long-lived connection.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Unavailable`] if the database cannot be
    /// created.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| RepositoryError::Unavailable(format!("Invalid database URL: {e}")))?;

        // Every connection would get its own empty database, so keep exactly one alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::Unavailable(format!("Failed to connect: {e}")))?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Unavailable`] if schema creation fails.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| RepositoryError::Unavailable(format!("Failed to create schema: {e}")))?;

        Ok(Self { pool })
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection. Later operations fail with
    /// [`RepositoryError::Unavailable`].
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn fetch_all(&self, operation: &'static str) -> Result<Vec<Todo>> {
        let rows: Vec<TodoRow> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error(operation, &e))?;

        decode_rows(rows)
    }

    async fn fetch_one(&self, id: TodoId, operation: &'static str) -> Result<Option<Todo>> {
        let row: Option<TodoRow> =
            sqlx::query_as("SELECT id, label, date, checked FROM todos WHERE id = ?")
                .bind(id.value())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| storage_error(operation, &e))?;

        row.map(decode_row).transpose()
    }
}

impl TodoRepository for SqliteTodoRepository {
    fn list_all(&self) -> RepositoryFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            record("list_all");
            tracing::debug!("Listing todos");
            self.fetch_all("list todos").await
        })
    }

    fn get_by_id(&self, id: TodoId) -> RepositoryFuture<'_, Option<Todo>> {
        Box::pin(async move {
            record("get_by_id");
            tracing::debug!(%id, "Fetching todo");
            self.fetch_one(id, "get todo").await
        })
    }

    fn create(&self, todo: Todo) -> RepositoryFuture<'_, Todo> {
        Box::pin(async move {
            record("create");
            tracing::debug!(id = %todo.id, "Inserting todo");

            let result = sqlx::query("INSERT INTO todos (id, label, date, checked) VALUES (?, ?, ?, ?)")
                .bind(todo.id.value())
                .bind(&todo.label)
                .bind(&todo.date)
                .bind(i64::from(todo.checked))
                .execute(&self.pool)
                .await;

            match result {
                Ok(_) => Ok(todo),
                Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                    tracing::debug!(id = %todo.id, "Duplicate todo id");
                    Err(RepositoryError::Conflict(todo.id))
                },
                Err(e) => Err(storage_error("create todo", &e)),
            }
        })
    }

    fn toggle(&self, id: TodoId, checked: bool) -> RepositoryFuture<'_, Option<Todo>> {
        Box::pin(async move {
            record("toggle");
            tracing::debug!(%id, checked, "Updating todo");

            sqlx::query("UPDATE todos SET checked = ? WHERE id = ?")
                .bind(i64::from(checked))
                .bind(id.value())
                .execute(&self.pool)
                .await
                .map_err(|e| storage_error("toggle todo", &e))?;

            self.fetch_one(id, "toggle todo").await
        })
    }

    fn delete_by_id(&self, id: TodoId) -> RepositoryFuture<'_, bool> {
        Box::pin(async move {
            record("delete_by_id");
            tracing::debug!(%id, "Deleting todo");

            let result = sqlx::query("DELETE FROM todos WHERE id = ?")
                .bind(id.value())
                .execute(&self.pool)
                .await
                .map_err(|e| storage_error("delete todo", &e))?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn delete_all_checked(&self) -> RepositoryFuture<'_, u64> {
        Box::pin(async move {
            record("delete_all_checked");
            tracing::debug!("Deleting checked todos");

            let result = sqlx::query("DELETE FROM todos WHERE checked = 1")
                .execute(&self.pool)
                .await
                .map_err(|e| storage_error("delete checked todos", &e))?;

            Ok(result.rows_affected())
        })
    }

    fn set_all_checked(&self, checked: bool) -> RepositoryFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            record("set_all_checked");
            tracing::debug!(checked, "Updating all todos");

            sqlx::query("UPDATE todos SET checked = ?")
                .bind(i64::from(checked))
                .execute(&self.pool)
                .await
                .map_err(|e| storage_error("update all todos", &e))?;

            self.fetch_all("update all todos").await
        })
    }

    fn ping(&self) -> RepositoryFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| storage_error("ping", &e))?;
            Ok(())
        })
    }
}
