use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::{debug, info, instrument};

use super::{TodoStore, INITIAL_VERSION};
use crate::error::{StoreError, StoreResult};
use crate::filter::TodoFilter;
use crate::types::{NewTodo, Todo};

const SCHEMA: &str = include_str!("../../migrations/0001_create_todos.sql");

const COLUMNS: &str = "id, task, deadline, todo_parent, is_completed, version";

/// Pool settings for [`SqliteStore::connect`].
#[derive(Debug, Clone)]
pub struct SqliteStoreOptions {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for SqliteStoreOptions {
    fn default() -> Self {
        Self {
            url: "sqlite://todos.db".to_string(),
            max_connections: 25,
            acquire_timeout: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, FromRow)]
struct TodoRow {
    id: i64,
    task: String,
    deadline: Option<DateTime<Utc>>,
    todo_parent: Option<i64>,
    is_completed: bool,
    version: i64,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            task: row.task,
            deadline: row.deadline,
            is_completed: row.is_completed,
            parent_id: row.todo_parent,
            version: row.version,
            children: Vec::new(),
        }
    }
}

/// SQLite-backed store. There is no foreign key on `todo_parent`, so
/// deleting a parent leaves its children pointing at a missing id.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a pool (creating the database file if needed) and apply the
    /// schema.
    pub async fn connect(options: &SqliteStoreOptions) -> StoreResult<Self> {
        let connect = SqliteConnectOptions::from_str(&options.url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect_with(connect)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!(
            url = %options.url,
            max_connections = options.max_connections,
            "sqlite store ready"
        );
        Ok(store)
    }

    /// A private in-memory database. The pool is pinned to one connection
    /// that never expires, since closing it would discard the data.
    pub async fn in_memory() -> StoreResult<Self> {
        let connect = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Wrap an existing pool. The schema is not applied.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Wait for checked-out connections to return, then close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("sqlite store closed");
    }
}

#[async_trait]
impl TodoStore for SqliteStore {
    #[instrument(skip_all)]
    async fn create(&self, todo: NewTodo) -> StoreResult<Todo> {
        let sql = format!(
            "INSERT INTO todos (task, deadline, todo_parent, is_completed, version) \
             VALUES (?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        );
        let row: TodoRow = sqlx::query_as(&sql)
            .bind(&todo.task)
            .bind(todo.deadline)
            .bind(todo.parent_id)
            .bind(false)
            .bind(INITIAL_VERSION)
            .fetch_one(&self.pool)
            .await?;
        debug!(id = row.id, "todo created");
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> StoreResult<Todo> {
        let sql = format!("SELECT {COLUMNS} FROM todos WHERE id = ?");
        let row: Option<TodoRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Todo::from).ok_or(StoreError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &TodoFilter) -> StoreResult<Vec<Todo>> {
        // The ascending id order is what the hierarchy assembler relies on.
        let sql = format!(
            "SELECT {COLUMNS} FROM todos \
             WHERE ?1 IS NULL OR is_completed = ?1 \
             ORDER BY id ASC"
        );
        let rows: Vec<TodoRow> = sqlx::query_as(&sql)
            .bind(filter.completed)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    #[instrument(skip(self, todo), fields(id = todo.id, version = todo.version))]
    async fn update(&self, todo: &Todo) -> StoreResult<Todo> {
        let sql = format!(
            "UPDATE todos \
             SET task = ?, deadline = ?, todo_parent = ?, is_completed = ?, version = ? \
             WHERE id = ? AND version = ? \
             RETURNING {COLUMNS}"
        );
        let row: Option<TodoRow> = sqlx::query_as(&sql)
            .bind(&todo.task)
            .bind(todo.deadline)
            .bind(todo.parent_id)
            .bind(todo.is_completed)
            .bind(todo.version + 1)
            .bind(todo.id)
            .bind(todo.version)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                debug!(version = row.version, "todo updated");
                Ok(row.into())
            }
            None => Err(StoreError::EditConflict {
                id: todo.id,
                version: todo.version,
            }),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        debug!(rows = result.rows_affected(), "todo deleted");
        Ok(())
    }
}
